//! Demonstration data: one dataset plus a study with a full analysis tree,
//! loaded through the same upsert cascade the API uses.

use crate::logic::upsert_tree;
use crate::model::EntityKind;
use crate::schema::{load, LoadMode};
use crate::store::RecordStore;
use serde_json::json;

pub async fn load_seed_data<S: RecordStore>(store: &S) -> anyhow::Result<()> {
    let dataset = json!({
        "name": "Demo coordinate collection",
        "description": "Seed data for local development"
    });
    let data = load(EntityKind::Dataset, &dataset, LoadMode::Update)
        .map_err(|errors| anyhow::anyhow!("seed dataset payload invalid: {:?}", errors))?;
    upsert_tree(store, EntityKind::Dataset, &data, None).await?;

    let study = json!({
        "name": "Flanker conflict study",
        "description": "Go/no-go flanker task, young adults",
        "doi": "10.1000/demo.001",
        "analyses": [
            {
                "name": "incongruent > congruent",
                "description": "conflict contrast",
                "images": [
                    {"path": "conflict_zmap.nii.gz", "space": "MNI", "value_type": "Z"}
                ],
                "points": [
                    {
                        "x": -2.0, "y": 18.0, "z": 44.0, "space": "MNI", "kind": "peak",
                        "values": [{"kind": "z", "value": 5.1}]
                    },
                    {
                        "x": 36.0, "y": 22.0, "z": -4.0, "space": "MNI", "kind": "peak",
                        "values": [{"kind": "z", "value": 4.2}]
                    }
                ]
            },
            {
                "name": "task > baseline",
                "description": "main effect of task"
            }
        ]
    });
    let data = load(EntityKind::Study, &study, LoadMode::Update)
        .map_err(|errors| anyhow::anyhow!("seed study payload invalid: {:?}", errors))?;
    let root = upsert_tree(store, EntityKind::Study, &data, None).await?;
    log::info!("seeded demo study {}", root.id());

    Ok(())
}
