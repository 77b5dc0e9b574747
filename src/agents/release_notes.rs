use crate::error::{Result, StepperError};
use crate::github::ReleaseSource;
use crate::steplib::{StepCatalog, VersionComparator};
use crate::utils::GitRepository;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// step id → version → source repository URL
pub type StepVersionUrls = BTreeMap<String, BTreeMap<String, String>>;

/// Parses a `YYYY-MM-DD` cutoff as midnight UTC.
pub fn parse_cutoff(date: &str) -> Result<Timestamp> {
    let parse_err = |reason: String| StepperError::DateParse {
        input: date.to_string(),
        reason,
    };
    let day: Date = date.trim().parse().map_err(|e: jiff::Error| parse_err(e.to_string()))?;
    let zoned = day
        .to_zoned(TimeZone::UTC)
        .map_err(|e| parse_err(e.to_string()))?;
    Ok(zoned.timestamp())
}

/// Step versions published after a cutoff, split into brand new and updated steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepChanges {
    pub new_steps: StepVersionUrls,
    pub updated_steps: StepVersionUrls,
}

impl StepChanges {
    /// A step is new when its group holds a single version, updated otherwise.
    pub fn since(catalog: &StepCatalog, cutoff: Timestamp) -> Self {
        let mut changes = StepChanges::default();

        for (step_id, group) in &catalog.steps {
            let is_first_version = group.versions.len() == 1;

            for (version, step) in &group.versions {
                let Some(published_at) = step.published_at else {
                    warn!("step without publish time: {step_id}@{version}");
                    continue;
                };
                if published_at <= cutoff {
                    continue;
                }
                let Some(git_url) = step.git_url() else {
                    warn!("step without source: {step_id}@{version}");
                    continue;
                };

                let target = if is_first_version {
                    &mut changes.new_steps
                } else {
                    &mut changes.updated_steps
                };
                target.entry(step_id.clone()).or_default().insert(
                    version.clone(),
                    git_url.trim_end_matches(".git").to_string(),
                );
            }
        }

        changes
    }
}

/// Rewrites a release note line as a `- ` bullet, or `None` if nothing is left.
pub fn normalize_release_line(line: &str) -> Option<String> {
    let trimmed = line.strip_prefix('*').unwrap_or(line);
    let trimmed = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    let trimmed = trimmed.trim();

    let mut chars = trimmed.chars();
    let first = chars.next()?;
    Some(format!("- {}{}", first.to_lowercase(), chars.as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepUpdate {
    pub step_id: String,
    pub latest_version: String,
    pub notes: Vec<String>,
}

/// Markdown ready summary of step changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changelog {
    /// (step id, version) pairs
    pub new_steps: Vec<(String, String)>,
    pub updates: Vec<StepUpdate>,
}

impl fmt::Display for Changelog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "## New steps")?;
        writeln!(f)?;
        for (step_id, version) in &self.new_steps {
            writeln!(f, "- __{step_id} {version}__")?;
        }

        writeln!(f)?;
        writeln!(f, "---")?;
        writeln!(f)?;

        writeln!(f, "## Step updates")?;
        writeln!(f)?;
        for update in &self.updates {
            writeln!(f, "- __{} {}:__", update.step_id, update.latest_version)?;
            for note in &update.notes {
                writeln!(f, "  {note}")?;
            }
        }
        Ok(())
    }
}

/// Turns step changes into a changelog, pulling notes from the release source.
pub struct ReleaseNotesCollector<'a> {
    source: &'a dyn ReleaseSource,
    show_progress: bool,
}

impl<'a> ReleaseNotesCollector<'a> {
    pub fn new(source: &'a dyn ReleaseSource) -> Self {
        Self {
            source,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn collect(&self, changes: &StepChanges) -> Result<Changelog> {
        let mut changelog = Changelog::default();

        for (step_id, versions) in &changes.new_steps {
            for version in versions.keys() {
                changelog.new_steps.push((step_id.clone(), version.clone()));
            }
        }

        let pb = ProgressBar::new(changes.updated_steps.len() as u64);
        if !self.show_progress {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.set_style(
            ProgressStyle::with_template("  [{bar:40}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        for (step_id, version_urls) in &changes.updated_steps {
            pb.set_message(format!("Fetching {step_id}"));

            let mut versions: Vec<String> = version_urls.keys().cloned().collect();
            let latest_version = VersionComparator::latest(&versions)?;
            VersionComparator::sort(&mut versions);

            let mut notes = Vec::new();
            for version in &versions {
                let repository = GitRepository::parse(&version_urls[version])?;
                let body = self
                    .source
                    .release_notes(&repository.owner, &repository.repo, version)?;
                if let Some(body) = body {
                    notes.extend(body.lines().filter_map(normalize_release_line));
                }
            }

            changelog.updates.push(StepUpdate {
                step_id: step_id.clone(),
                latest_version,
                notes,
            });
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(changelog)
    }
}
