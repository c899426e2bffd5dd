//! Academic records reporting: subject averages, competency bands, at-risk
//! indicators and billing, derived from per-unit grades in SQLite and served
//! as HTML pages.

pub mod calc;
pub mod config;
pub mod db;
pub mod derive;
pub mod model;
pub mod render;
pub mod reports;
pub mod web;
