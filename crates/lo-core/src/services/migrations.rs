use std::sync::LazyLock;

use regex::Regex;

static BOOTSTRAPPED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)database (is )?already bootstrapped|database is up-to-date").unwrap()
});

static PROCESSED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+migrations?\s+processed").unwrap());

/// What a migrations container's logs say about the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationStatus {
    AlreadyBootstrapped,
    Completed { processed: u32 },
    Unclear,
}

pub fn classify(logs: &str) -> MigrationStatus {
    if BOOTSTRAPPED_RE.is_match(logs) {
        return MigrationStatus::AlreadyBootstrapped;
    }
    let counts: Vec<u32> = PROCESSED_RE
        .captures_iter(logs)
        .map(|caps| caps[1].parse::<u32>().unwrap_or(0))
        .collect();
    if counts.is_empty() {
        MigrationStatus::Unclear
    } else {
        MigrationStatus::Completed {
            processed: counts.iter().sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_bootstrapped_database() {
        assert_eq!(
            classify("Database already bootstrapped\n"),
            MigrationStatus::AlreadyBootstrapped
        );
        assert_eq!(
            classify("Database is up-to-date\n"),
            MigrationStatus::AlreadyBootstrapped
        );
    }

    #[test]
    fn sums_processed_migrations() {
        let logs = "migrating core on database 'kong'...\n\
                    core migrated up to: 000_base (executed)\n\
                    42 migrations processed\n\
                    1 migration processed\n";
        assert_eq!(classify(logs), MigrationStatus::Completed { processed: 43 });
    }

    #[test]
    fn unparseable_count_still_completes() {
        assert_eq!(
            classify("99999999999 migrations processed\n"),
            MigrationStatus::Completed { processed: 0 }
        );
    }

    #[test]
    fn anything_else_is_unclear() {
        assert_eq!(classify(""), MigrationStatus::Unclear);
        assert_eq!(
            classify("Error: connection refused"),
            MigrationStatus::Unclear
        );
    }
}
