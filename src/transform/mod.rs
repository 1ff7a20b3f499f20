pub mod aggregate;
pub mod join;
pub mod kpi;
