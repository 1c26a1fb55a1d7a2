use crate::sources::CandidateSource;
use crate::types::{SifError, Target};
use crate::utils::deduplicate;
use async_trait::async_trait;

/// Bucket names guessed from the labels of the target host.
#[derive(Debug, Clone)]
pub struct BucketSource {
    target: Target,
}

impl BucketSource {
    pub fn new(target: Target) -> Self {
        Self { target }
    }
}

/// Every label `l` yields `l`, `l-s3` and `s3-l`; each pair of adjacent
/// labels `a.b` also yields `a-b` and `b-a`.
pub fn bucket_names(host: &str) -> Vec<String> {
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    let mut names = Vec::with_capacity(labels.len() * 5);

    for (i, label) in labels.iter().enumerate() {
        names.push(label.to_string());
        names.push(format!("{}-s3", label));
        names.push(format!("s3-{}", label));

        if let Some(next) = labels.get(i + 1) {
            names.push(format!("{}-{}", label, next));
            names.push(format!("{}-{}", next, label));
        }
    }

    deduplicate(names)
}

#[async_trait]
impl CandidateSource for BucketSource {
    fn name(&self) -> &str {
        "buckets"
    }

    async fn load(&self) -> Result<Vec<String>, SifError> {
        Ok(bucket_names(self.target.host()))
    }
}
