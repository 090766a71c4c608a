pub mod text_fields;
