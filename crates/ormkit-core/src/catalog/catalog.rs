//! In-memory model registry.

use std::collections::HashMap;

use tracing::debug;

use super::field::FieldDef;
use super::meta::{ModelMeta, ModelRegistry};
use super::model::ModelDef;
use super::relation::{RelationDef, RelationKind};
use super::types::FieldType;
use crate::error::Error;

/// A linked, validated set of models.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    models: Vec<ModelDef>,
    by_name: HashMap<String, usize>,
}

/// Primary-key facts needed while linking.
struct PkInfo {
    table: String,
    column: String,
    field_type: FieldType,
}

impl Catalog {
    /// Link and validate a set of model declarations.
    ///
    /// Fills in foreign-key columns, reverse relations and many-to-many
    /// defaults. Model order is preserved.
    pub fn new(models: impl IntoIterator<Item = ModelDef>) -> Result<Self, Error> {
        let mut models: Vec<ModelDef> = models.into_iter().collect();

        let mut by_name = HashMap::with_capacity(models.len());
        for (idx, model) in models.iter_mut().enumerate() {
            if model.table.is_empty() {
                model.table = model.name.to_lowercase();
            }
            if by_name.insert(model.name.clone(), idx).is_some() {
                return Err(Error::Configuration(format!(
                    "model {} is declared twice",
                    model.name
                )));
            }
        }

        let mut pks = HashMap::with_capacity(models.len());
        for model in &models {
            let mut pk_fields = model.fields.iter().filter(|f| f.pk);
            let pk = match (pk_fields.next(), pk_fields.next()) {
                (Some(pk), None) => pk,
                (None, _) => {
                    return Err(Error::Configuration(format!(
                        "model {} has no primary key",
                        model.name
                    )))
                }
                (Some(_), Some(_)) => {
                    return Err(Error::Configuration(format!(
                        "model {} declares more than one primary key",
                        model.name
                    )))
                }
            };
            pks.insert(
                model.name.clone(),
                PkInfo {
                    table: model.table.clone(),
                    column: pk.column().to_string(),
                    field_type: pk.field_type.clone(),
                },
            );
        }

        let mut reverse: Vec<(usize, RelationDef)> = Vec::new();
        for model in models.iter_mut() {
            link_model(model, &pks, &by_name, &mut reverse)?;
        }

        for (idx, relation) in reverse {
            let target = &mut models[idx];
            if target.field(&relation.name).is_some() || target.relation(&relation.name).is_some() {
                return Err(Error::Configuration(format!(
                    "related name {} clashes with an existing member of {}",
                    relation.name, target.name
                )));
            }
            debug!(model = %target.name, relation = %relation.name, "added reverse relation");
            target.relations.push(relation);
        }

        Ok(Self { models, by_name })
    }

    /// Load model declarations from a JSON array and link them.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let models: Vec<ModelDef> = serde_json::from_str(json)?;
        Self::new(models)
    }

    /// Get a model definition by name.
    pub fn get_model(&self, name: &str) -> Option<&ModelDef> {
        self.by_name.get(name).map(|&idx| &self.models[idx])
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

fn link_model(
    model: &mut ModelDef,
    pks: &HashMap<String, PkInfo>,
    by_name: &HashMap<String, usize>,
    reverse: &mut Vec<(usize, RelationDef)>,
) -> Result<(), Error> {
    let Some(own_pk) = pks.get(&model.name) else {
        return Ok(());
    };
    let own_table = own_pk.table.clone();

    for idx in 0..model.relations.len() {
        let relation_name = model.relations[idx].name.clone();
        let target_name = model.relations[idx].target.clone();
        let (Some(target_pk), Some(&target_idx)) = (pks.get(&target_name), by_name.get(&target_name))
        else {
            return Err(Error::Configuration(format!(
                "relation {}.{} references unknown model {}",
                model.name, relation_name, target_name
            )));
        };

        match &mut model.relations[idx].kind {
            RelationKind::ForeignKey {
                source_field,
                one_to_one,
                null,
                related_name,
                description,
                ..
            } => {
                if source_field.is_empty() {
                    *source_field = format!("{relation_name}_id");
                }
                let column = FieldDef {
                    name: source_field.clone(),
                    source_field: None,
                    field_type: target_pk.field_type.clone(),
                    pk: false,
                    null: *null,
                    unique: *one_to_one,
                    index: false,
                    description: description.clone(),
                    default: None,
                    reference: Some(relation_name.clone()),
                };
                if let Some(related) = related_name.clone() {
                    reverse.push((
                        target_idx,
                        RelationDef {
                            name: related,
                            target: model.name.clone(),
                            kind: RelationKind::BackwardForeignKey {
                                relation_field: source_field.clone(),
                                one_to_one: *one_to_one,
                            },
                        },
                    ));
                }
                match model.fields.iter_mut().find(|f| f.name == column.name) {
                    Some(existing) => {
                        existing.field_type = column.field_type;
                        existing.reference = column.reference;
                        existing.unique |= column.unique;
                    }
                    None => model.fields.push(column),
                }
            }
            RelationKind::ManyToMany {
                through,
                forward_key,
                backward_key,
                owns_through,
                related_name,
                description,
            } => {
                if through.is_empty() {
                    *through = format!("{}_{}", own_table, target_pk.table);
                }
                if backward_key.is_empty() {
                    *backward_key = format!("{own_table}_id");
                }
                if forward_key.is_empty() {
                    *forward_key = format!("{}_id", target_pk.table);
                    if forward_key == backward_key {
                        *forward_key = format!("{}_rel_id", target_pk.table);
                    }
                }
                if forward_key == backward_key {
                    return Err(Error::Configuration(format!(
                        "relation {}.{} uses {} as both link table keys",
                        model.name, relation_name, forward_key
                    )));
                }
                if let Some(related) = related_name.clone() {
                    reverse.push((
                        target_idx,
                        RelationDef {
                            name: related,
                            target: model.name.clone(),
                            kind: RelationKind::ManyToMany {
                                through: through.clone(),
                                forward_key: backward_key.clone(),
                                backward_key: forward_key.clone(),
                                owns_through: !*owns_through,
                                related_name: None,
                                description: description.clone(),
                            },
                        },
                    ));
                }
            }
            RelationKind::BackwardForeignKey { .. } => {}
        }
    }
    Ok(())
}

impl ModelMeta for ModelDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn table(&self) -> &str {
        &self.table
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    fn relations(&self) -> &[RelationDef] {
        &self.relations
    }

    fn unique_together(&self) -> &[Vec<String>] {
        &self.unique_together
    }

    fn indexes(&self) -> &[Vec<String>] {
        &self.indexes
    }
}

impl ModelRegistry for Catalog {
    fn model(&self, name: &str) -> Option<&dyn ModelMeta> {
        self.get_model(name).map(|m| m as &dyn ModelMeta)
    }

    fn models(&self) -> Vec<&dyn ModelMeta> {
        self.models.iter().map(|m| m as &dyn ModelMeta).collect()
    }
}
