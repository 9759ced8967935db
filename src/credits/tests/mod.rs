mod common;

mod aggregation;
mod evaluation;
mod selection;
mod validation;
