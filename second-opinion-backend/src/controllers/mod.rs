pub mod health;
pub mod medical_details;
pub mod second_opinion;
