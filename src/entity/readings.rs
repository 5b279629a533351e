use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "readings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ts: Option<DateTimeWithTimeZone>,
    pub ph: Option<f64>,
    pub temp: Option<f64>,
    pub outlet1: Option<f64>,
    pub outlet2: Option<f64>,
    pub outlet3: Option<f64>,
    pub outlet4: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
