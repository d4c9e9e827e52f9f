// Jobs module - background maintenance tasks

pub mod expiry_sweeper;
