//! Caller identity and capability checks.
//!
//! Every request resolves to a [`Caller`]. Role-dependent behaviour goes
//! through [`is_permitted`] instead of ad-hoc role comparisons.

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{Role, UserId};

/// An authenticated user as claimed by a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

/// Who is making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Caller {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Caller {
    pub fn user(user_id: UserId, role: Role) -> Self {
        Caller::Authenticated(Identity { user_id, role })
    }

    pub fn identity(&self) -> Option<Identity> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(identity) => Some(*identity),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.identity().map(|i| i.user_id)
    }

    pub fn role(&self) -> Option<Role> {
        self.identity().map(|i| i.role)
    }

    pub fn can(&self, capability: Capability) -> bool {
        is_permitted(self.role(), capability)
    }

    /// The caller's identity, or `Unauthorized` for anonymous callers.
    pub fn require_identity(&self) -> Result<Identity, QuizError> {
        self.identity().ok_or(QuizError::Unauthorized)
    }

    /// Fail unless the caller holds `capability`. Anonymous callers get
    /// `Unauthorized`, authenticated ones `Forbidden`.
    pub fn require(&self, capability: Capability) -> Result<(), QuizError> {
        if self.can(capability) {
            return Ok(());
        }
        match self {
            Caller::Anonymous if !is_permitted(None, capability) => {
                Err(QuizError::Unauthorized)
            }
            _ => Err(QuizError::Forbidden(capability.denial_message().into())),
        }
    }
}

/// Things a caller may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// See quizzes that are not active.
    ViewInactiveQuizzes,
    /// See the correct answer of each question.
    ViewCorrectAnswers,
    /// Create, update and delete quizzes.
    ManageQuizzes,
    /// List every submission made to a quiz.
    ViewQuizSubmissions,
    /// List the caller's own submissions.
    ViewOwnSubmissions,
    /// Submit answers to an active quiz.
    SubmitAnswers,
}

impl Capability {
    fn denial_message(&self) -> &'static str {
        match self {
            Capability::ViewOwnSubmissions | Capability::SubmitAnswers => {
                "You do not have permission to access this resource"
            }
            _ => "Admin access required",
        }
    }
}

/// Whether a caller holding `role` (or none, when anonymous) has `capability`.
pub fn is_permitted(role: Option<Role>, capability: Capability) -> bool {
    match capability {
        Capability::SubmitAnswers => true,
        Capability::ViewOwnSubmissions => role.is_some(),
        Capability::ViewInactiveQuizzes
        | Capability::ViewCorrectAnswers
        | Capability::ManageQuizzes
        | Capability::ViewQuizSubmissions => role == Some(Role::Admin),
    }
}
