use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub movie_id: String,
    pub title: String,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
    pub rating: Option<f64>,
    pub gross: Option<f64>,
    pub runtime_min: Option<i32>,
    pub description: Option<String>,
    pub raw_row: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
