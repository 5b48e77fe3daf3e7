pub mod jwt;
pub mod passgen;
pub mod pwd;
pub mod time;
pub mod validated_form;
