use crate::args::{ChatArgs, ListArgs};
use crate::chat::Rules;
use crate::commands::render::render;
use crate::commands::{list_params, plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{ChatDraft, ChatEntry};
use crate::repo::Repository;
use crate::{Config, Result};
use anyhow::anyhow;
use tracing::debug;

/// Answers a question with the built-in assistant and saves the exchange to the chat history.
pub async fn chat(config: Config, args: ChatArgs) -> Result<Out<ChatEntry>> {
    let session = config.session()?;
    let message = args
        .message()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| anyhow!("The message cannot be empty"))
        .pub_result(ErrorType::Request)?;

    let response = Rules::default().reply(message, &session.name);
    debug!("Answering '{message}'");
    let draft = ChatDraft {
        message: message.to_string(),
        response,
    };
    let entry: ChatEntry = config
        .db()
        .insert(&session.student_id, draft)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(entry.response().to_string(), entry))
}

/// Lists past questions and answers, oldest first unless the order is reversed.
pub async fn chat_history(config: Config, args: ListArgs) -> Result<Out<Vec<ChatEntry>>> {
    let session = config.session()?;
    let params = list_params(session)
        .from(args.from())
        .to(args.to())
        .order(args.order());
    let entries: Vec<ChatEntry> = config
        .db()
        .list(&params)
        .await
        .pub_result(ErrorType::Database)?;
    let rows = render(&entries, args.format()).pub_result(ErrorType::Request)?;
    let message = format!("{} message{}", entries.len(), plural(entries.len()));
    Ok(Out::new(message, entries).with_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::repo::SortOrder;
    use crate::test::{TestEnv, NAME};

    #[tokio::test]
    async fn test_chat_replies_and_saves() {
        let env = TestEnv::logged_in().await;
        let out = chat(env.config(), ChatArgs::new("Halo!")).await.unwrap();
        assert!(out.message().starts_with(&format!("Hello {NAME}!")), "{}", out.message());
        assert_eq!(out.structure().unwrap().message(), "Halo!");

        chat(env.config(), ChatArgs::new("how do I see my jadwal?"))
            .await
            .unwrap();

        let out = chat_history(env.config(), ListArgs::default())
            .await
            .unwrap();
        assert_eq!(out.message(), "2 messages");
        let entries = out.structure().unwrap();
        assert_eq!(entries[0].message(), "Halo!");
        assert!(entries[1].response().contains("campus schedule"));

        let args = ListArgs::new(None, None, SortOrder::Desc);
        let out = chat_history(env.config(), args).await.unwrap();
        assert_eq!(out.structure().unwrap()[0].message(), "how do I see my jadwal?");
    }

    #[tokio::test]
    async fn test_chat_fallback() {
        let env = TestEnv::logged_in().await;
        let out = chat(env.config(), ChatArgs::new("what is the meaning of life"))
            .await
            .unwrap();
        assert!(out.message().starts_with("Thanks for your question!"));
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_message() {
        let env = TestEnv::logged_in().await;
        let err = chat(env.config(), ChatArgs::new("   ")).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }

    #[tokio::test]
    async fn test_chat_requires_login() {
        let env = TestEnv::new().await;
        let err = chat(env.config(), ChatArgs::new("halo")).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Session));
    }
}
