pub use error::{EngineError, WorkflowError};
pub use invitations::InvitationStatus;
pub use ops::{
    AcceptInvitationParams, Engine, EngineBuilder, GroupCreated, GroupDeleted, InvitationAccepted,
    InviteUserParams, MemberRemoved, RecordExpenseParams, RegisterUserParams, UserInvited,
};
pub use queries::{
    CreateExpenseParams, CreateGroupMemberParams, CreateGroupParams, CreateInvitationParams,
    CreateUserParams, DeleteGroupParams, Page, Queries, UpdateExpenseParams, UpdateGroupParams,
    UpdateInvitationParams, UpdateUserParams,
};
pub use workflow::{Step, TxContext, Workflow, WorkflowState};

pub mod categories;
mod credentials;
mod error;
pub mod expenses;
pub mod group_members;
pub mod groups;
pub mod invitations;
mod ops;
mod queries;
pub mod users;
mod workflow;

pub type ResultEngine<T> = Result<T, EngineError>;
