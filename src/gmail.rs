use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::Deserialize;

use crate::collaborators::MailSearch;
use crate::error::SyncError;
use crate::google_api::ApiClient;
use crate::models::{AttachmentRef, MessageSummary};
use crate::search::SearchCriteria;

/// Gmail sends attachment data as base64url, with or without padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageId>,
}

#[derive(Debug, Deserialize)]
struct MessageId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GmailMessage {
    id: String,
    #[serde(default)]
    snippet: String,
    payload: Option<MessagePart>,
}

#[derive(Debug, Default, Deserialize)]
struct MessagePart {
    #[serde(default)]
    filename: String,
    #[serde(default)]
    headers: Vec<Header>,
    body: Option<PartBody>,
    #[serde(default)]
    parts: Vec<MessagePart>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct PartBody {
    #[serde(rename = "attachmentId")]
    attachment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AttachmentBody {
    #[serde(default)]
    data: String,
}

fn collect_attachments(part: &MessagePart, out: &mut Vec<AttachmentRef>) {
    if !part.filename.is_empty() {
        if let Some(attachment_id) = part.body.as_ref().and_then(|body| body.attachment_id.clone()) {
            out.push(AttachmentRef {
                filename: part.filename.clone(),
                attachment_id,
            });
        }
    }
    for child in &part.parts {
        collect_attachments(child, out);
    }
}

fn summarize(message: GmailMessage) -> MessageSummary {
    let payload = message.payload.unwrap_or_default();
    let date = payload
        .headers
        .iter()
        .find(|header| header.name.eq_ignore_ascii_case("Date"))
        .map(|header| header.value.clone());
    let mut attachments = Vec::new();
    collect_attachments(&payload, &mut attachments);

    MessageSummary {
        id: message.id,
        date,
        snippet: message.snippet,
        attachments,
    }
}

/// Decodes a Gmail `data` field.
///
/// # Errors
///
/// [`SyncError::Decode`] for characters outside the base64url alphabet.
pub fn decode_attachment_data(data: &str) -> Result<Vec<u8>, SyncError> {
    URL_SAFE_LENIENT
        .decode(data.trim())
        .map_err(|error| SyncError::Decode {
            what: "attachment data",
            message: error.to_string(),
        })
}

/// Gmail REST adapter for the signed-in user (`users/me`).
#[derive(Debug, Clone)]
pub struct GmailClient {
    api: ApiClient,
}

impl GmailClient {
    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, SyncError> {
        Ok(Self {
            api: ApiClient::new("gmail", base_url, access_token)?,
        })
    }
}

impl MailSearch for GmailClient {
    fn list_message_ids(&self, criteria: &SearchCriteria) -> Result<Vec<String>, SyncError> {
        let query = criteria.query();
        tracing::debug!(%query, "searching mailbox");
        let list: MessageList = self
            .api
            .get_json("users/me/messages", &[("q", query.as_str())])?;
        Ok(list.messages.into_iter().map(|message| message.id).collect())
    }

    fn get_message(&self, id: &str) -> Result<MessageSummary, SyncError> {
        let path = format!("users/me/messages/{}", urlencoding::encode(id));
        let message: GmailMessage = self.api.get_json(&path, &[("format", "full")])?;
        Ok(summarize(message))
    }

    fn download_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<Vec<u8>, SyncError> {
        let path = format!(
            "users/me/messages/{}/attachments/{}",
            urlencoding::encode(message_id),
            urlencoding::encode(attachment_id)
        );
        let body: AttachmentBody = self.api.get_json(&path, &[])?;
        decode_attachment_data(&body.data)
    }
}

#[cfg(test)]
mod tests {
    use super::{GmailMessage, MessageList, decode_attachment_data, summarize};

    #[test]
    fn reads_nested_attachment_parts() {
        let json = r#"{
            "id": "18b1",
            "snippet": "Schedule for next week",
            "payload": {
                "headers": [{"name": "Date", "value": "Mon, 9 Oct 2023 10:00:00 -0400"}],
                "parts": [
                    {"filename": "", "body": {"size": 12}},
                    {"filename": "", "parts": [
                        {"filename": "Server Schedule 10-9.pdf", "body": {"attachmentId": "ANGj"}}
                    ]},
                    {"filename": "logo.png", "body": {"attachmentId": "ANGk"}}
                ]
            }
        }"#;
        let message: GmailMessage = serde_json::from_str(json).expect("message json parses");
        let summary = summarize(message);

        assert_eq!(summary.id, "18b1");
        assert_eq!(summary.date.as_deref(), Some("Mon, 9 Oct 2023 10:00:00 -0400"));
        assert_eq!(summary.attachments.len(), 2);
        assert_eq!(summary.attachments[0].filename, "Server Schedule 10-9.pdf");
        assert_eq!(summary.attachments[0].attachment_id, "ANGj");
    }

    #[test]
    fn empty_search_has_no_messages_field() {
        let list: MessageList =
            serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).expect("list json parses");
        assert!(list.messages.is_empty());
    }

    #[test]
    fn decodes_base64url_with_or_without_padding() {
        assert_eq!(decode_attachment_data("JVBERi0").expect("unpadded"), b"%PDF-");
        assert_eq!(decode_attachment_data("JVBERi0=").expect("padded"), b"%PDF-");
        assert_eq!(decode_attachment_data("-_8").expect("url alphabet"), vec![0xfb, 0xff]);
        assert!(decode_attachment_data("***").is_err());
    }
}
