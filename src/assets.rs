use rust_embed::RustEmbed;

/// SQL migrations compiled into the binary so a bare executable can
/// bootstrap its own database.
#[derive(RustEmbed)]
#[folder = "migrations/"]
#[include = "*.sql"]
pub struct MigrationAssets;

impl MigrationAssets {
    /// Returns (filename, contents) pairs in filename order. Migration
    /// files are named `NNN_description.sql` so lexicographic order is
    /// application order.
    pub fn get_migrations() -> Vec<(String, String)> {
        let mut migrations: Vec<(String, String)> = Self::iter()
            .filter_map(|name| {
                let file = Self::get(&name)?;
                let content = String::from_utf8(file.data.into_owned()).ok()?;
                Some((name.to_string(), content))
            })
            .collect();

        migrations.sort_by(|a, b| a.0.cmp(&b.0));
        migrations
    }
}
