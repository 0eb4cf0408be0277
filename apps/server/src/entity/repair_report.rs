//! Repair report entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "repair_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Container code: 4 letters followed by 7 digits
    pub container_number: String,
    pub report_date: Date,
    pub technician_name: String,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub warranty_id: Option<String>,
    pub warranty_status: Option<String>,
    pub setpoint: f64,
    pub vents: Option<String>,
    pub humidity: Option<String>,
    pub ambient_temp: f64,
    pub supply_temp_before: f64,
    pub supply_temp_after: f64,
    pub return_temp_before: f64,
    pub return_temp_after: f64,
    pub temp_in_range: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub problem_description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub comments: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::repair_job::Entity")]
    Jobs,
    #[sea_orm(has_many = "super::alarm::Entity")]
    Alarms,
}

impl Related<super::repair_job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Jobs.def()
    }
}

impl Related<super::alarm::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alarms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
