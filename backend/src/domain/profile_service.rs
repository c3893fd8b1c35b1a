//! Profile management service: household members, their subjects, and
//! grade updates.

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::domain::commands::profiles::{
    AddSubjectCommand, AddSubjectResult, CreateProfileCommand, CreateProfileResult,
    ListProfilesResult, RemoveSubjectCommand, SubjectMutationResult, UpdateSubjectGradeCommand,
};
use crate::domain::models::grade::Subject;
use crate::domain::models::profile::Profile;
use crate::storage::csv::{CsvConnection, ProfileRepository};
use crate::storage::traits::ProfileStorage;

const MAX_NAME_LENGTH: usize = 128;

/// Service for managing profiles in the household.
#[derive(Clone)]
pub struct ProfileService {
    profile_repository: ProfileRepository,
}

impl ProfileService {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        let profile_repository = ProfileRepository::new((*connection).clone());
        Self { profile_repository }
    }

    /// Create a new profile with an empty subject list and a zero balance.
    pub fn create_profile(&self, command: CreateProfileCommand) -> Result<CreateProfileResult> {
        validate_name(&command.name)?;

        let now = Utc::now();
        let profile = Profile {
            id: Profile::generate_id(now.timestamp_millis() as u64),
            household_id: command.household_id,
            name: command.name.trim().to_string(),
            role: command.role,
            subjects: Vec::new(),
            rates: None,
            balance_cents: 0,
            created_at: now,
            updated_at: now,
        };

        self.profile_repository.store_profile(&profile)?;
        info!("Created profile {} ({})", profile.name, profile.id);

        Ok(CreateProfileResult { profile })
    }

    pub fn get_profile(&self, profile_id: &str) -> Result<Option<Profile>> {
        self.profile_repository.get_profile(profile_id)
    }

    /// Get a profile, failing if it does not exist.
    pub fn require_profile(&self, profile_id: &str) -> Result<Profile> {
        self.profile_repository
            .get_profile(profile_id)?
            .ok_or_else(|| anyhow::anyhow!("Profile not found: {}", profile_id))
    }

    pub fn list_profiles(&self, household_id: &str) -> Result<ListProfilesResult> {
        let profiles = self.profile_repository.list_profiles(household_id)?;
        Ok(ListProfilesResult { profiles })
    }

    /// Add a subject to a profile.
    pub fn add_subject(&self, command: AddSubjectCommand) -> Result<AddSubjectResult> {
        validate_name(&command.name)?;

        let mut profile = self.require_profile(&command.profile_id)?;
        let subject = Subject::new(command.name.trim(), command.grade);
        profile.subjects.push(subject.clone());
        profile.updated_at = Utc::now();
        self.profile_repository.update_profile(&profile)?;

        info!(
            "Added subject {} ({}) to profile {}",
            subject.name, subject.grade, profile.id
        );
        Ok(AddSubjectResult { profile, subject })
    }

    /// Change the grade of an existing subject. This is what moves a
    /// profile's hourly rate between report cards.
    pub fn update_subject_grade(
        &self,
        command: UpdateSubjectGradeCommand,
    ) -> Result<SubjectMutationResult> {
        let mut profile = self.require_profile(&command.profile_id)?;
        let subject = profile
            .subjects
            .iter_mut()
            .find(|s| s.id == command.subject_id)
            .ok_or_else(|| anyhow::anyhow!("Subject not found: {}", command.subject_id))?;

        let old_grade = subject.grade;
        subject.grade = command.grade;
        profile.updated_at = Utc::now();
        self.profile_repository.update_profile(&profile)?;

        info!(
            "Updated subject {} on profile {}: {} -> {}",
            command.subject_id, command.profile_id, old_grade, command.grade
        );
        Ok(SubjectMutationResult { profile })
    }

    /// Remove a subject from a profile.
    pub fn remove_subject(&self, command: RemoveSubjectCommand) -> Result<SubjectMutationResult> {
        let mut profile = self.require_profile(&command.profile_id)?;
        let before = profile.subjects.len();
        profile.subjects.retain(|s| s.id != command.subject_id);
        if profile.subjects.len() == before {
            return Err(anyhow::anyhow!("Subject not found: {}", command.subject_id));
        }
        profile.updated_at = Utc::now();
        self.profile_repository.update_profile(&profile)?;

        Ok(SubjectMutationResult { profile })
    }
}

fn validate_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(anyhow::anyhow!("Name cannot be empty"));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(anyhow::anyhow!(
            "Name cannot exceed {} characters",
            MAX_NAME_LENGTH
        ));
    }
    Ok(())
}
