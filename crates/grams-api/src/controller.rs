//! Authorization-gated actions on grams.
//!
//! Every action that targets an existing gram runs its checks in a fixed
//! order: the gram must exist, then an actor must be present, then that
//! actor must own the gram. Decoding and validating the submitted fields
//! runs last, and the store is only written once everything has passed.

use tracing::{debug, info};
use uuid::Uuid;

use grams_types::api::GramForm;
use grams_types::models::{Actor, Gram};

use crate::error::{GramError, GramResult};
use crate::store::GramStore;
use crate::validation::{self, Submission};

/// Path every successful mutation redirects to.
pub const ROOT_PATH: &str = "/";

/// Successful mutation: the caller should redirect to `location`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: &'static str,
    pub gram_id: Uuid,
}

impl Redirect {
    fn to_root(gram_id: Uuid) -> Self {
        Self {
            location: ROOT_PATH,
            gram_id,
        }
    }
}

pub fn is_owner(actor: &Actor, gram: &Gram) -> bool {
    actor.id == gram.owner_id
}

pub struct GramController<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: GramStore + ?Sized> GramController<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn list(&self) -> GramResult<Vec<Gram>> {
        Ok(self.store.all()?)
    }

    pub fn show(&self, id: &str) -> GramResult<Gram> {
        self.find(id)
    }

    pub fn new_form(&self, actor: Option<&Actor>) -> GramResult<GramForm> {
        authenticated(actor)?;
        Ok(GramForm::blank())
    }

    pub fn create(
        &self,
        actor: Option<&Actor>,
        submission: impl Into<Submission>,
    ) -> GramResult<Redirect> {
        let actor = authenticated(actor)?;
        let fields = submission.into().into_fields().map_err(GramError::ValidationFailed)?;
        let changes = validation::validate_new(&fields).map_err(GramError::ValidationFailed)?;

        let gram = self.store.insert(actor.id, &changes)?;
        info!("Gram {} created by {}", gram.id, actor.username);
        Ok(Redirect::to_root(gram.id))
    }

    pub fn edit_form(&self, actor: Option<&Actor>, id: &str) -> GramResult<GramForm> {
        let (_, gram) = self.authorize(actor, id)?;
        Ok(GramForm::for_gram(&gram))
    }

    pub fn update(
        &self,
        actor: Option<&Actor>,
        id: &str,
        submission: impl Into<Submission>,
    ) -> GramResult<Redirect> {
        let (actor, gram) = self.authorize(actor, id)?;
        let fields = submission.into().into_fields().map_err(GramError::ValidationFailed)?;
        let changes =
            validation::validate_changes(&gram, &fields).map_err(GramError::ValidationFailed)?;

        self.store
            .update(gram.id, &changes)?
            .ok_or_else(|| GramError::NotFound(id.to_string()))?;
        info!("Gram {} updated by {}", gram.id, actor.username);
        Ok(Redirect::to_root(gram.id))
    }

    pub fn destroy(&self, actor: Option<&Actor>, id: &str) -> GramResult<Redirect> {
        let (actor, gram) = self.authorize(actor, id)?;

        if !self.store.delete(gram.id)? {
            return Err(GramError::NotFound(id.to_string()));
        }
        info!("Gram {} deleted by {}", gram.id, actor.username);
        Ok(Redirect::to_root(gram.id))
    }

    /// Existence, then authentication, then ownership.
    fn authorize<'b>(&self, actor: Option<&'b Actor>, id: &str) -> GramResult<(&'b Actor, Gram)> {
        let gram = self.find(id)?;
        let actor = authenticated(actor)?;

        if !is_owner(actor, &gram) {
            debug!("{} is not the owner of gram {}", actor.username, gram.id);
            return Err(GramError::Forbidden {
                actor: actor.id,
                gram: gram.id,
            });
        }
        Ok((actor, gram))
    }

    fn find(&self, id: &str) -> GramResult<Gram> {
        self.store
            .find(id)?
            .ok_or_else(|| GramError::NotFound(id.to_string()))
    }
}

fn authenticated(actor: Option<&Actor>) -> GramResult<&Actor> {
    actor.ok_or(GramError::AuthenticationRequired)
}
