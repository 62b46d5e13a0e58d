//! In-memory project workspace store
//!
//! Owns projects with their attributes, classes, and training associations,
//! and hands out immutable snapshots for evaluation.

use chrono::Utc;
use parking_lot::RwLock;
use probabilitas_core::{
    attribute_code, class_code, AssociationMap, Attribute, AttributeId, ClassId, ClassRecord,
    Error, Project, ProjectId, RecordKind, Result, TrainingAssociation,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Longest accepted title, label, or name
pub const MAX_NAME_LEN: usize = 255;

/// Request to create a project with an initial batch of attributes and classes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub x_label: String,
    pub y_label: String,

    /// Number of attributes to generate (`X1..Xn`)
    pub x_count: usize,

    /// Number of classes to generate (`Y1..Yn`)
    pub y_count: usize,
}

/// Listing entry for the project dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub attributes_count: usize,
    pub classes_count: usize,
}

/// Editable view of one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub project: Project,
    pub attributes: Vec<Attribute>,
    pub classes: Vec<ClassRecord>,

    /// Explicit association rows keyed `"{class_id}_{attribute_id}"`
    pub training: BTreeMap<String, bool>,
}

/// Immutable data the classifier engine reads for one project
#[derive(Debug, Clone)]
pub struct ProjectSnapshot {
    pub project: Project,
    pub attributes: Vec<Attribute>,
    pub classes: Vec<ClassRecord>,
    pub associations: AssociationMap,
}

/// Serializable form of the whole store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub next_project_id: u64,
    pub next_attribute_id: u64,
    pub next_class_id: u64,
    pub projects: Vec<Project>,
    pub attributes: Vec<Attribute>,
    pub classes: Vec<ClassRecord>,
    pub training: Vec<TrainingAssociation>,
}

#[derive(Debug, Default)]
struct StoreState {
    next_project_id: u64,
    next_attribute_id: u64,
    next_class_id: u64,
    projects: BTreeMap<ProjectId, Project>,
    // creation order doubles as display order
    attributes: Vec<Attribute>,
    classes: Vec<ClassRecord>,
    training: HashMap<(ClassId, AttributeId), TrainingAssociation>,
    // bumped by every successful write
    revision: u64,
}

impl StoreState {
    fn project(&self, id: ProjectId) -> Result<&Project> {
        self.projects
            .get(&id)
            .ok_or_else(|| Error::not_found(RecordKind::Project, id))
    }

    fn project_attributes(&self, id: ProjectId) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(move |a| a.project_id == id)
    }

    fn project_classes(&self, id: ProjectId) -> impl Iterator<Item = &ClassRecord> {
        self.classes.iter().filter(move |c| c.project_id == id)
    }

    fn attribute_mut(&mut self, project: ProjectId, id: AttributeId) -> Result<&mut Attribute> {
        self.attributes
            .iter_mut()
            .find(|a| a.id == id && a.project_id == project)
            .ok_or_else(|| Error::not_found(RecordKind::Attribute, id))
    }

    fn class_mut(&mut self, project: ProjectId, id: ClassId) -> Result<&mut ClassRecord> {
        self.classes
            .iter_mut()
            .find(|c| c.id == id && c.project_id == project)
            .ok_or_else(|| Error::not_found(RecordKind::Class, id))
    }

    fn push_attribute(&mut self, project: ProjectId, code: String, name: String) -> Attribute {
        self.next_attribute_id += 1;
        let attribute = Attribute::new(AttributeId(self.next_attribute_id), project, code, name);
        self.attributes.push(attribute.clone());
        attribute
    }

    fn push_class(&mut self, project: ProjectId, code: String, name: String) -> ClassRecord {
        self.next_class_id += 1;
        let class = ClassRecord::new(ClassId(self.next_class_id), project, code, name);
        self.classes.push(class.clone());
        class
    }

    fn upsert(&mut self, record: TrainingAssociation) {
        self.training
            .insert((record.class_id, record.attribute_id), record);
    }

    /// Insert an explicit `false` row unless one already exists
    fn backfill(&mut self, project: ProjectId, class_id: ClassId, attribute_id: AttributeId) {
        self.training
            .entry((class_id, attribute_id))
            .or_insert_with(|| TrainingAssociation::new(project, class_id, attribute_id, false));
    }
}

/// Thread-safe project store
#[derive(Debug, Default)]
pub struct ProjectStore {
    state: RwLock<StoreState>,
}

impl ProjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut state = StoreState {
            next_project_id: snapshot.next_project_id,
            next_attribute_id: snapshot.next_attribute_id,
            next_class_id: snapshot.next_class_id,
            projects: snapshot.projects.into_iter().map(|p| (p.id, p)).collect(),
            attributes: snapshot.attributes,
            classes: snapshot.classes,
            training: HashMap::new(),
            revision: 0,
        };
        for record in snapshot.training {
            state.upsert(record);
        }

        // Never hand out an id that is already taken
        let max_project = state.projects.keys().map(|id| id.0).max().unwrap_or(0);
        let max_attribute = state.attributes.iter().map(|a| a.id.0).max().unwrap_or(0);
        let max_class = state.classes.iter().map(|c| c.id.0).max().unwrap_or(0);
        state.next_project_id = state.next_project_id.max(max_project);
        state.next_attribute_id = state.next_attribute_id.max(max_attribute);
        state.next_class_id = state.next_class_id.max(max_class);

        Self {
            state: RwLock::new(state),
        }
    }

    /// Counter that changes whenever the store is modified
    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    /// Capture the whole store
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read();
        let mut training: Vec<TrainingAssociation> = state.training.values().copied().collect();
        training.sort_by_key(|t| (t.project_id, t.class_id, t.attribute_id));

        StoreSnapshot {
            next_project_id: state.next_project_id,
            next_attribute_id: state.next_attribute_id,
            next_class_id: state.next_class_id,
            projects: state.projects.values().cloned().collect(),
            attributes: state.attributes.clone(),
            classes: state.classes.clone(),
            training,
        }
    }

    /// Create a project with generated attributes `X1..Xn` and classes `Y1..Yn`
    pub fn create_project(&self, request: NewProject) -> Result<Project> {
        let title = validate_name("title", &request.title)?;
        let x_label = validate_name("x_label", &request.x_label)?;
        let y_label = validate_name("y_label", &request.y_label)?;
        if request.x_count < 1 {
            return Err(Error::validation("x_count must be at least 1"));
        }
        if request.y_count < 1 {
            return Err(Error::validation("y_count must be at least 1"));
        }

        let mut state = self.state.write();
        state.next_project_id += 1;
        let project = Project {
            id: ProjectId(state.next_project_id),
            title,
            description: request.description.filter(|d| !d.trim().is_empty()),
            x_label,
            y_label,
            created_at: Utc::now(),
        };
        state.projects.insert(project.id, project.clone());

        for i in 1..=request.x_count {
            let name = format!("{} {}", project.x_label, i);
            state.push_attribute(project.id, attribute_code(i), name);
        }
        for i in 1..=request.y_count {
            let name = format!("{} {}", project.y_label, i);
            state.push_class(project.id, class_code(i), name);
        }

        state.revision += 1;
        info!(
            project = %project.id,
            attributes = request.x_count,
            classes = request.y_count,
            "created project"
        );
        Ok(project)
    }

    /// All projects, newest first
    pub fn list_projects(&self) -> Vec<ProjectSummary> {
        let state = self.state.read();
        let mut summaries: Vec<ProjectSummary> = state
            .projects
            .values()
            .map(|project| ProjectSummary {
                project: project.clone(),
                attributes_count: state.project_attributes(project.id).count(),
                classes_count: state.project_classes(project.id).count(),
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.project
                .created_at
                .cmp(&a.project.created_at)
                .then(b.project.id.cmp(&a.project.id))
        });
        summaries
    }

    pub fn get_project(&self, id: ProjectId) -> Result<Project> {
        self.state.read().project(id).cloned()
    }

    /// Delete a project along with its attributes, classes, and associations
    pub fn delete_project(&self, id: ProjectId) -> Result<()> {
        let mut state = self.state.write();
        state.project(id)?;

        state.projects.remove(&id);
        state.attributes.retain(|a| a.project_id != id);
        state.classes.retain(|c| c.project_id != id);
        state.training.retain(|_, t| t.project_id != id);
        state.revision += 1;

        info!(project = %id, "deleted project");
        Ok(())
    }

    /// Project with its attributes, classes, and explicit association rows
    pub fn workspace(&self, id: ProjectId) -> Result<Workspace> {
        let state = self.state.read();
        let project = state.project(id)?.clone();

        let training = state
            .training
            .values()
            .filter(|t| t.project_id == id)
            .map(|t| (format!("{}_{}", t.class_id, t.attribute_id), t.is_associated))
            .collect();

        Ok(Workspace {
            project,
            attributes: state.project_attributes(id).cloned().collect(),
            classes: state.project_classes(id).cloned().collect(),
            training,
        })
    }

    pub fn rename_attribute(
        &self,
        project: ProjectId,
        attribute: AttributeId,
        name: &str,
    ) -> Result<Attribute> {
        let name = validate_name("name", name)?;
        let mut state = self.state.write();
        state.project(project)?;

        let record = state.attribute_mut(project, attribute)?;
        record.name = name;
        let record = record.clone();
        state.revision += 1;
        debug!(project = %project, attribute = %attribute, "renamed attribute");
        Ok(record)
    }

    pub fn rename_class(&self, project: ProjectId, class: ClassId, name: &str) -> Result<ClassRecord> {
        self.update_class(project, class, Some(name), None)
    }

    /// Store a prior in `(0, 1]`; `None` or `0` clears it back to uniform
    pub fn set_class_prior(
        &self,
        project: ProjectId,
        class: ClassId,
        prior: Option<f64>,
    ) -> Result<ClassRecord> {
        let prior = validate_prior(prior)?;
        let mut state = self.state.write();
        state.project(project)?;

        let record = state.class_mut(project, class)?;
        record.prior_probability = prior;
        let record = record.clone();
        state.revision += 1;
        debug!(project = %project, class = %class, prior = ?prior, "updated class prior");
        Ok(record)
    }

    /// Rename a class and/or change its prior in one step
    ///
    /// Both fields are validated before anything is written, so a rejected
    /// update leaves the class untouched. A `prior` of `0` clears the stored
    /// prior; `None` leaves it as is.
    pub fn update_class(
        &self,
        project: ProjectId,
        class: ClassId,
        name: Option<&str>,
        prior: Option<f64>,
    ) -> Result<ClassRecord> {
        if name.is_none() && prior.is_none() {
            return Err(Error::validation("name or prior_probability is required"));
        }
        let name = name.map(|n| validate_name("name", n)).transpose()?;
        let prior = prior.map(|p| validate_prior(Some(p))).transpose()?;

        let mut state = self.state.write();
        state.project(project)?;

        let record = state.class_mut(project, class)?;
        if let Some(name) = name {
            record.name = name;
        }
        if let Some(prior) = prior {
            record.prior_probability = prior;
        }
        let record = record.clone();
        state.revision += 1;
        debug!(project = %project, class = %class, "updated class");
        Ok(record)
    }

    /// Append an attribute and backfill `false` rows against every class
    pub fn add_attribute(&self, project: ProjectId, name: &str) -> Result<Attribute> {
        let name = validate_name("name", name)?;
        let mut state = self.state.write();
        state.project(project)?;

        // Codes come from the current count and are never renumbered.
        let code = attribute_code(state.project_attributes(project).count() + 1);
        let attribute = state.push_attribute(project, code, name);

        let class_ids: Vec<ClassId> = state.project_classes(project).map(|c| c.id).collect();
        for class_id in class_ids {
            state.backfill(project, class_id, attribute.id);
        }

        state.revision += 1;
        info!(project = %project, code = %attribute.code, "added attribute");
        Ok(attribute)
    }

    /// Append a class and backfill `false` rows against every attribute
    pub fn add_class(&self, project: ProjectId, name: &str) -> Result<ClassRecord> {
        let name = validate_name("name", name)?;
        let mut state = self.state.write();
        state.project(project)?;

        let code = class_code(state.project_classes(project).count() + 1);
        let class = state.push_class(project, code, name);

        let attribute_ids: Vec<AttributeId> =
            state.project_attributes(project).map(|a| a.id).collect();
        for attribute_id in attribute_ids {
            state.backfill(project, class.id, attribute_id);
        }

        state.revision += 1;
        info!(project = %project, code = %class.code, "added class");
        Ok(class)
    }

    /// Insert or update the association flag for a class/attribute pair
    pub fn upsert_training(
        &self,
        project: ProjectId,
        class_id: ClassId,
        attribute_id: AttributeId,
        is_associated: bool,
    ) -> Result<TrainingAssociation> {
        let mut state = self.state.write();
        state.project(project)?;
        state.class_mut(project, class_id)?;
        state.attribute_mut(project, attribute_id)?;

        let record = TrainingAssociation::new(project, class_id, attribute_id, is_associated);
        state.upsert(record);
        state.revision += 1;
        debug!(
            project = %project,
            class = %class_id,
            attribute = %attribute_id,
            is_associated,
            "upserted training association"
        );
        Ok(record)
    }

    /// Consistent copy of everything the engine needs for one project
    pub fn project_snapshot(&self, id: ProjectId) -> Result<ProjectSnapshot> {
        let state = self.state.read();
        let project = state.project(id)?.clone();
        let associations = state
            .training
            .values()
            .filter(|t| t.project_id == id)
            .collect();

        Ok(ProjectSnapshot {
            project,
            attributes: state.project_attributes(id).cloned().collect(),
            classes: state.project_classes(id).cloned().collect(),
            associations,
        })
    }

    pub fn project_count(&self) -> usize {
        self.state.read().projects.len()
    }
}

fn validate_name(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(Error::validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_prior(prior: Option<f64>) -> Result<Option<f64>> {
    match prior {
        None => Ok(None),
        Some(p) if p == 0.0 => Ok(None),
        Some(p) if p > 0.0 && p <= 1.0 => Ok(Some(p)),
        Some(p) => Err(Error::validation(format!(
            "prior_probability must be in (0, 1], got {}",
            p
        ))),
    }
}
