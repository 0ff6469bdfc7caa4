// Service-level tests over the in-memory store

pub mod day_assembler_test;
pub mod workout_mutation_test;
