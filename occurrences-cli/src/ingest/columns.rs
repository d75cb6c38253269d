//! Column mapping from source header labels onto the canonical schema

use std::collections::{BTreeMap, HashSet};

use super::header::HeaderLabel;
use super::model::CanonicalField;

/// Recognized header aliases per canonical field, in priority order
pub const ALIAS_TABLE: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::Id,
        &[
            "id",
            "codigo",
            "code",
            "ref",
            "reference",
            "occurrence_id",
            "ocorrência n.º",
            "ocorrencia n.",
        ],
    ),
    (
        CanonicalField::Type,
        &[
            "type",
            "tipo",
            "descricao",
            "description",
            "title",
            "categoria",
            "tipo de evento meteorológico",
            "class. interna",
            "tipo ocorrência",
        ],
    ),
    (
        CanonicalField::Location,
        &[
            "location",
            "local",
            "localizacao",
            "morada",
            "endereco",
            "freguesia",
            "concelho",
        ],
    ),
    (
        CanonicalField::Severity,
        &["severity", "severidade", "nivel", "gravidade", "impacto"],
    ),
    (CanonicalField::Status, &["status", "estado", "situacao"]),
    (
        CanonicalField::Timestamp,
        &[
            "timestamp",
            "data",
            "data_hora",
            "datetime",
            "hora",
            "created_at",
            "date",
            "data de alerta",
        ],
    ),
];

/// Alias lists for every canonical field, in schema declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<(CanonicalField, Vec<String>)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            entries: ALIAS_TABLE
                .iter()
                .map(|(field, aliases)| (*field, aliases.iter().map(|a| a.to_string()).collect()))
                .collect(),
        }
    }
}

impl AliasTable {
    /// Append aliases after the built-in ones of `field`
    pub fn extend(&mut self, field: CanonicalField, aliases: impl IntoIterator<Item = String>) {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(f, _)| *f == field) {
            for alias in aliases {
                if !existing.iter().any(|a| a.eq_ignore_ascii_case(&alias)) {
                    existing.push(alias);
                }
            }
        }
    }

    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, aliases)| aliases.as_slice())
            .unwrap_or(&[])
    }

    pub fn entries(&self) -> impl Iterator<Item = (CanonicalField, &[String])> {
        self.entries.iter().map(|(f, a)| (*f, a.as_slice()))
    }
}

/// A source column chosen for a canonical field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub index: usize,
    pub label: String,
}

/// Canonical field -> source column; absent fields read as null
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<CanonicalField, ResolvedColumn>,
}

impl ColumnMapping {
    pub fn get(&self, field: CanonicalField) -> Option<&ResolvedColumn> {
        self.columns.get(&field)
    }

    pub fn label(&self, field: CanonicalField) -> Option<&str> {
        self.get(field).map(|c| c.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Map header labels onto canonical fields.
///
/// Fields are resolved in declaration order. For each field the first alias
/// that equals (case-insensitively) an unclaimed label wins; a claimed label
/// is not offered to later fields.
pub fn map_columns(labels: &[HeaderLabel], aliases: &AliasTable) -> ColumnMapping {
    let lowered: Vec<Option<String>> = labels
        .iter()
        .map(|l| l.name().map(str::to_lowercase))
        .collect();

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut mapping = ColumnMapping::default();

    for (field, field_aliases) in aliases.entries() {
        let found = field_aliases.iter().find_map(|alias| {
            let alias = alias.to_lowercase();
            lowered.iter().enumerate().find_map(|(index, label)| match label {
                Some(label) if *label == alias && !claimed.contains(&index) => Some(index),
                _ => None,
            })
        });

        match found {
            Some(index) => {
                claimed.insert(index);
                mapping.columns.insert(
                    field,
                    ResolvedColumn {
                        index,
                        label: labels[index].to_string(),
                    },
                );
            }
            None => log::debug!("No source column found for field '{}'", field),
        }
    }

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(labels: &[&str]) -> Vec<HeaderLabel> {
        labels
            .iter()
            .map(|l| HeaderLabel::Named(l.to_string()))
            .collect()
    }

    #[test]
    fn test_maps_portuguese_headers() {
        let labels = named(&["Ocorrência N.º", "Estado", "Local", "Data de Alerta", "Tipo", "Impacto"]);
        let mapping = map_columns(&labels, &AliasTable::default());

        assert_eq!(mapping.label(CanonicalField::Id), Some("Ocorrência N.º"));
        assert_eq!(mapping.label(CanonicalField::Status), Some("Estado"));
        assert_eq!(mapping.label(CanonicalField::Location), Some("Local"));
        assert_eq!(mapping.label(CanonicalField::Timestamp), Some("Data de Alerta"));
        assert_eq!(mapping.label(CanonicalField::Type), Some("Tipo"));
        assert_eq!(mapping.label(CanonicalField::Severity), Some("Impacto"));
        assert_eq!(mapping.get(CanonicalField::Location).unwrap().index, 2);
    }

    #[test]
    fn test_alias_priority_beats_label_order() {
        // "concelho" is a later alias than "local"
        let labels = named(&["Concelho", "Local"]);
        let mapping = map_columns(&labels, &AliasTable::default());
        assert_eq!(mapping.label(CanonicalField::Location), Some("Local"));
    }

    #[test]
    fn test_label_order_does_not_change_mapping() {
        let forward = named(&["ID", "Status", "Date", "Freguesia", "Gravidade"]);
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = map_columns(&forward, &AliasTable::default());
        let b = map_columns(&reversed, &AliasTable::default());
        for field in CanonicalField::ALL {
            assert_eq!(a.label(field), b.label(field), "field {}", field);
        }
    }

    #[test]
    fn test_missing_fields_map_to_none() {
        let labels = named(&["Estado", "Observações"]);
        let mapping = map_columns(&labels, &AliasTable::default());
        assert_eq!(mapping.len(), 1);
        assert!(mapping.get(CanonicalField::Id).is_none());
        assert!(mapping.get(CanonicalField::Timestamp).is_none());
    }

    #[test]
    fn test_placeholders_never_match() {
        let labels = vec![HeaderLabel::Placeholder(0), HeaderLabel::Named("tipo".into())];
        let mapping = map_columns(&labels, &AliasTable::default());
        assert!(mapping.get(CanonicalField::Id).is_none());
        assert_eq!(mapping.label(CanonicalField::Type), Some("tipo"));
    }

    #[test]
    fn test_claimed_label_goes_to_first_field() {
        let mut aliases = AliasTable::default();
        // "estado" now also an alias of location, which is declared before status
        aliases.extend(CanonicalField::Location, vec!["estado".to_string()]);
        let labels = named(&["Estado"]);
        let mapping = map_columns(&labels, &aliases);
        assert_eq!(mapping.label(CanonicalField::Location), Some("Estado"));
        assert!(mapping.get(CanonicalField::Status).is_none());
    }

    #[test]
    fn test_extra_aliases_are_appended() {
        let mut aliases = AliasTable::default();
        aliases.extend(
            CanonicalField::Severity,
            vec!["prioridade".to_string(), "IMPACTO".to_string()],
        );
        let sev = aliases.aliases(CanonicalField::Severity);
        assert_eq!(sev.first().map(String::as_str), Some("severity"));
        assert_eq!(sev.last().map(String::as_str), Some("prioridade"));
        assert_eq!(sev.len(), 6);

        let mapping = map_columns(&named(&["Prioridade"]), &aliases);
        assert_eq!(mapping.label(CanonicalField::Severity), Some("Prioridade"));
    }
}
