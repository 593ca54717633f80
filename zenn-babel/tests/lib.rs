// This file is required to make `cargo test` discover tests in subdirectories.

#[cfg(test)]
mod formats;

#[cfg(test)]
mod markdown;

#[cfg(test)]
mod table;
