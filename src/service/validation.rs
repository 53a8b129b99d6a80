use crate::error::{Error, Result};

const MAX_NAME_LEN: usize = 255;

fn validate_name(name: &str, entity: &str) -> std::result::Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{entity} name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!(
            "{entity} name cannot exceed {MAX_NAME_LEN} characters"
        ));
    }
    if name.chars().any(char::is_control) {
        return Err(format!("{entity} name contains invalid characters"));
    }
    Ok(())
}

pub fn validate_folder_name(name: &str) -> Result<()> {
    validate_name(name, "Folder").map_err(Error::Validation)
}

pub fn validate_diagram_name(name: &str) -> Result<()> {
    validate_name(name, "Diagram").map_err(Error::Validation)
}

pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::validation("Diagram content cannot be empty"));
    }
    Ok(())
}
