use surrealdb::{Surreal, engine::any::Any};

use crate::{
    audit,
    consts::store_const::MESSAGE_TABLE,
    errors::{Error, Result},
    models::message::Message,
    utils::time,
};

/// Stores a participant-addressed message, optionally tied to an
/// appointment. The `read` flag starts false and currently stays there.
pub async fn send_message(
    db: &Surreal<Any>,
    sender_id: &str,
    receiver_id: &str,
    appointment_id: Option<String>,
    content: &str,
) -> Result<Message> {
    let content = content.trim();
    if content.is_empty() {
        return Err(Error::MissingField("content"));
    }
    if receiver_id.trim().is_empty() {
        return Err(Error::MissingField("receiver_id"));
    }

    let message = Message {
        sender_id: sender_id.to_string(),
        receiver_id: receiver_id.to_string(),
        appointment_id,
        content: content.to_string(),
        created_at: time::now_rfc3339(),
        read: false,
    };
    let created: Option<Message> = db.create(MESSAGE_TABLE).content(message.clone()).await?;

    audit::record(
        db.clone(),
        sender_id,
        format!("Sent message to {receiver_id}"),
    );

    Ok(created.unwrap_or(message))
}

/// Inbox read for the teacher dashboard.
pub async fn list_for_receiver(db: &Surreal<Any>, receiver_id: &str) -> Result<Vec<Message>> {
    let messages: Vec<Message> = db
        .query("SELECT * FROM type::table($table) WHERE receiver_id = $receiver")
        .bind(("table", MESSAGE_TABLE))
        .bind(("receiver", receiver_id.to_string()))
        .await?
        .take(0)?;
    Ok(messages)
}
