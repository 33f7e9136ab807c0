// Seed rows for the equipment and sensor tables

use serde::{Deserialize, Serialize};

/// One entry of `equipment.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub equipment_id: u32,
    pub name: String,
    pub group_name: String,
}

/// One row of `equipment_sensors.csv` (header: `sensor_id,equipment_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentSensor {
    pub sensor_id: u32,
    pub equipment_id: u32,
}
