//! Table modules - each contains an `impl Database` block for one table.

mod medical_details;
