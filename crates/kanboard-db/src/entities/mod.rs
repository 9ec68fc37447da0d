//! Database entities

pub mod assignment;
pub mod attachment;
pub mod comment;
pub mod label;
pub mod lifecycle;
pub mod profile;
pub mod project;
pub mod status_stage;
pub mod task;
pub mod task_label;
pub mod team;
pub mod team_member;
pub mod user;

pub use lifecycle::Lifecycle;
pub use profile::UserRole;
pub use project::Priority;
pub use team_member::TeamRole;

pub mod prelude {
    pub use super::assignment::Entity as Assignment;
    pub use super::attachment::Entity as Attachment;
    pub use super::comment::Entity as Comment;
    pub use super::label::Entity as Label;
    pub use super::profile::Entity as Profile;
    pub use super::project::Entity as Project;
    pub use super::status_stage::Entity as StatusStage;
    pub use super::task::Entity as Task;
    pub use super::task_label::Entity as TaskLabel;
    pub use super::team::Entity as Team;
    pub use super::team_member::Entity as TeamMember;
    pub use super::user::Entity as User;
}
