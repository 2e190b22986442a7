use ember_database::{BackupService, Database};

pub type Error = anyhow::Error;

#[derive(Clone, Debug)]
pub struct Data {
    pub db: Database,
    pub backup: Option<BackupService>,
}

pub type Context<'a> = poise::Context<'a, Data, Error>;
