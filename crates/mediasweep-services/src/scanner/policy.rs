use std::str::FromStr;

use mediasweep_core::{AppError, ReferenceKind};

/// Ordered, non-empty set of reference checks the scanner runs.
///
/// Order only decides which lookup runs first; any match short-circuits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePolicy {
    kinds: Vec<ReferenceKind>,
}

impl ReferencePolicy {
    /// Keeps the first occurrence of each kind.
    pub fn new(kinds: impl IntoIterator<Item = ReferenceKind>) -> Result<Self, AppError> {
        let mut unique = Vec::new();
        for kind in kinds {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }

        if unique.is_empty() {
            return Err(AppError::InvalidInput(
                "A reference policy needs at least one check".to_string(),
            ));
        }

        Ok(Self { kinds: unique })
    }

    pub fn kinds(&self) -> &[ReferenceKind] {
        &self.kinds
    }

    /// True when every known reference kind is checked.
    pub fn is_complete(&self) -> bool {
        ReferenceKind::ALL.iter().all(|k| self.kinds.contains(k))
    }
}

impl Default for ReferencePolicy {
    fn default() -> Self {
        Self {
            kinds: ReferenceKind::ALL.to_vec(),
        }
    }
}

/// Parses a comma-separated list of kind names, e.g. `featured_image,content_url`.
impl FromStr for ReferencePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kinds = s
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                ReferenceKind::ALL
                    .into_iter()
                    .find(|kind| kind.as_str() == name)
                    .ok_or_else(|| {
                        AppError::InvalidInput(format!("Unknown reference check '{}'", name))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_runs_all_checks_in_order() {
        let policy = ReferencePolicy::default();
        assert_eq!(policy.kinds(), &ReferenceKind::ALL);
        assert!(policy.is_complete());
    }

    #[test]
    fn empty_policy_is_rejected() {
        assert!(ReferencePolicy::new(Vec::new()).is_err());
        assert!("".parse::<ReferencePolicy>().is_err());
    }

    #[test]
    fn duplicates_are_collapsed() {
        let policy = ReferencePolicy::new([
            ReferenceKind::ContentUrl,
            ReferenceKind::FeaturedImage,
            ReferenceKind::ContentUrl,
        ])
        .unwrap();
        assert_eq!(
            policy.kinds(),
            &[ReferenceKind::ContentUrl, ReferenceKind::FeaturedImage]
        );
        assert!(!policy.is_complete());
    }

    #[test]
    fn parses_kind_names() {
        let policy: ReferencePolicy = "featured_image, user_meta".parse().unwrap();
        assert_eq!(
            policy.kinds(),
            &[ReferenceKind::FeaturedImage, ReferenceKind::UserMeta]
        );
        assert!("featured_image,bogus".parse::<ReferencePolicy>().is_err());
    }
}
