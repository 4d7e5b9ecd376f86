//! The conversation: an append-only history of user and agent messages.
use tracing::error;

use crate::agent::base::Transport;
use crate::errors::TransportResult;
use crate::pipeline::{normalize, Normalized};
use crate::types::message::Message;

pub struct Conversation<T: Transport> {
    transport: T,
    history: Vec<Message>,
}

impl<T: Transport> Conversation<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            history: Vec::new(),
        }
    }

    /// Messages in the order they were appended.
    pub fn messages(&self) -> &[Message] {
        &self.history
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    pub fn set_endpoint<S: Into<String>>(&mut self, endpoint: S) {
        self.transport.set_endpoint(endpoint.into());
    }

    /// Submit user input and append the agent's normalized reply.
    ///
    /// Blank input is ignored and yields `Ok(None)`. When the agent cannot be
    /// reached, an error entry is appended to the history and the failure is
    /// also returned so the caller can surface it.
    pub fn submit(&mut self, input: &str) -> TransportResult<Option<&Message>> {
        let question = input.trim();
        if question.is_empty() {
            return Ok(None);
        }
        self.history.push(Message::user(question));

        match self.transport.ask(question) {
            Ok(response) => {
                let Normalized { content, kind } = normalize(&response);
                self.history.push(Message::agent(content, kind));
                Ok(self.history.last())
            }
            Err(e) => {
                error!("Error calling agent: {}", e);
                self.history.push(Message::agent_error(e.to_string()));
                Err(e)
            }
        }
    }
}
