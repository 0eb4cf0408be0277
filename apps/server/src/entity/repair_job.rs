//! Repair job entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "repair_jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub report_id: i32,
    pub job_code: Option<String>,
    pub description: Option<String>,
    pub part_number: Option<String>,
    pub part_description: Option<String>,
    pub quantity: i32,
    pub damage_type: Option<String>,
    pub old_serial: Option<String>,
    pub new_serial: Option<String>,
    pub labor_hours: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::repair_report::Entity",
        from = "Column::ReportId",
        to = "super::repair_report::Column::Id",
        on_delete = "Cascade"
    )]
    Report,
}

impl Related<super::repair_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
