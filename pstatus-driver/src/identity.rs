//! Build identity
//!
//! Names of the pipeline, team, job and build invoking the driver. The
//! resource adapter reads them from the environment; the driver only ever
//! receives them as values.

use pstatus_core::domain::status::BuildFailure;

/// Identity of the build invoking the driver
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildIdentity {
    pub pipeline: String,
    pub team: String,
    pub job: String,
    pub build_name: String,
    /// Base URL of the CI web UI, e.g. "https://ci.example.com"
    pub external_url: String,
}

impl BuildIdentity {
    /// Creates an identity with only pipeline and team set
    pub fn new(pipeline: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
            team: team.into(),
            ..Self::default()
        }
    }

    /// Sets the job and build names
    pub fn with_build(mut self, job: impl Into<String>, build_name: impl Into<String>) -> Self {
        self.job = job.into();
        self.build_name = build_name.into();
        self
    }

    /// Sets the CI web UI base URL
    pub fn with_external_url(mut self, external_url: impl Into<String>) -> Self {
        self.external_url = external_url.into();
        self
    }

    /// Link to this build in the CI web UI
    pub fn details_url(&self) -> String {
        format!(
            "{}/teams/{}/pipelines/{}/jobs/{}/builds/{}",
            self.external_url, self.team, self.pipeline, self.job, self.build_name
        )
    }

    /// Failure record pointing at this build
    pub fn failure(&self) -> BuildFailure {
        BuildFailure {
            job_name: self.job.clone(),
            build_name: self.build_name.clone(),
            details_url: self.details_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_url() {
        let identity = BuildIdentity::new("test-pipeline", "test-team")
            .with_build("test-job", "10")
            .with_external_url("https://concourse.example.com");

        assert_eq!(
            identity.details_url(),
            "https://concourse.example.com/teams/test-team/pipelines/test-pipeline/jobs/test-job/builds/10"
        );
    }

    #[test]
    fn test_failure_record() {
        let identity = BuildIdentity::new("p", "t")
            .with_build("unit", "7")
            .with_external_url("http://ci");

        let failure = identity.failure();
        assert_eq!(failure.job_name, "unit");
        assert_eq!(failure.build_name, "7");
        assert_eq!(failure.details_url, "http://ci/teams/t/pipelines/p/jobs/unit/builds/7");
    }
}
