use crate::profile::ProfileInput;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProfileFile {
    pub schema_version: String,
    pub subjects: Vec<ProfileInput>,
}
