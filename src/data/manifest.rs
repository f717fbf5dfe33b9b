//! Game data manifest: items, plants, recipes and zones.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::DataError;
use crate::shared::*;

pub const EMBEDDED_DATA: &str = include_str!("../../assets/data/verdant.ron");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    #[serde(default)]
    pub items: Vec<ItemDef>,
    #[serde(default)]
    pub plants: Vec<PlantDef>,
    #[serde(default)]
    pub recipes: Vec<CultivationRecipe>,
    #[serde(default)]
    pub zones: Vec<ZoneDef>,
}

impl GameData {
    pub fn embedded() -> Result<Self, DataError> {
        Self::from_ron(EMBEDDED_DATA)
    }

    pub fn from_ron(source: &str) -> Result<Self, DataError> {
        let data: Self = ron::from_str(source)?;
        data.validate()?;
        Ok(data)
    }

    pub fn load(path: &Path) -> Result<Self, DataError> {
        let source = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&source)
    }

    /// Every id non-empty and every cross-reference resolvable.
    pub fn validate(&self) -> Result<(), DataError> {
        let items: HashSet<&str> = self.items.iter().map(|i| i.id.as_str()).collect();
        let plants: HashSet<&str> = self.plants.iter().map(|p| p.id.as_str()).collect();

        if items.contains("") || plants.contains("") {
            return Err(DataError::Invalid("item and plant ids must not be empty".into()));
        }

        let require_item = |id: &str, referenced_by: &str| {
            if items.contains(id) {
                Ok(())
            } else {
                Err(DataError::UnknownReference {
                    kind: "item",
                    id: id.to_string(),
                    referenced_by: referenced_by.to_string(),
                })
            }
        };

        for plant in &self.plants {
            if plant.growth_time.is_nan() || plant.growth_time < 0.0 {
                return Err(DataError::Invalid(format!(
                    "plant '{}' has negative growth_time",
                    plant.id
                )));
            }
            require_item(&plant.seed_item, &plant.id)?;
            require_item(&plant.harvest_item, &plant.id)?;
        }

        for recipe in &self.recipes {
            require_item(&recipe.seed_item, &recipe.id)?;
            if !plants.contains(recipe.output_plant.as_str()) {
                return Err(DataError::UnknownReference {
                    kind: "plant",
                    id: recipe.output_plant.clone(),
                    referenced_by: recipe.id.clone(),
                });
            }
            for condition in &recipe.conditions {
                match condition.kind {
                    ConditionKind::ItemUsed => require_item(&condition.value, &recipe.id)?,
                    ConditionKind::Adjacency if !plants.contains(condition.value.as_str()) => {
                        return Err(DataError::UnknownReference {
                            kind: "plant",
                            id: condition.value.clone(),
                            referenced_by: recipe.id.clone(),
                        });
                    }
                    _ => {}
                }
            }
        }

        for zone in &self.zones {
            if zone.id.is_empty() {
                return Err(DataError::Invalid("zone ids must not be empty".into()));
            }
            if let UnlockRequirement::Item { item_id, .. } = &zone.requirement {
                require_item(item_id, &zone.id)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_data_is_valid() {
        let data = GameData::embedded().unwrap();
        assert!(!data.items.is_empty());
        assert!(data.recipes.iter().any(|r| r.seed_item == "seed_mystic"));
        assert!(data.zones.iter().any(|z| z.requirement == UnlockRequirement::Level(3)));
    }

    #[test]
    fn test_unknown_reference_is_reported() {
        let source = r#"(
            items: [(id: "seed_a", name: "Seed A")],
            plants: [],
            recipes: [(id: "r", name: "R", seed_item: "seed_a", output_plant: "ghost")],
        )"#;
        match GameData::from_ron(source) {
            Err(DataError::UnknownReference { kind, id, referenced_by }) => {
                assert_eq!(kind, "plant");
                assert_eq!(id, "ghost");
                assert_eq!(referenced_by, "r");
            }
            other => panic!("expected UnknownReference, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(GameData::from_ron("(items: [ oops"), Err(DataError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GameData::load(Path::new("/definitely/not/here.ron")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.ron"));
    }
}
