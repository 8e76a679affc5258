/// Region used when `--region` is not given.
pub const DEFAULT_REGION: &str = "eu-west-2";

/// `--region` value that fans out over every region in [`REGIONS`].
pub const ALL: &str = "all";

/// Regions visited by an `all` run, in report order.
pub const REGIONS: &[&str] = &[
    "af-south-1",
    "ap-east-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-south-1",
    "ap-southeast-3",
    "ca-central-1",
    "eu-central-1",
    "eu-north-1",
    "eu-south-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "me-south-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_no_duplicates() {
        let unique: HashSet<_> = REGIONS.iter().collect();
        assert_eq!(unique.len(), REGIONS.len());
    }

    #[test]
    fn default_region_is_in_catalog() {
        assert!(REGIONS.contains(&DEFAULT_REGION));
        assert!(!REGIONS.contains(&ALL));
    }
}
