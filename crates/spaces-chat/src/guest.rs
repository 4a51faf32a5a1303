use spaces_client::{chat_listener, ClientConfig, Identity, Session};
use std::time::Duration;
use tracing::info;

pub struct GuestOptions {
    pub space_id: String,
    pub display_name: String,
    pub message: String,
    pub listen_secs: u64,
}

pub async fn run(config: ClientConfig, options: GuestOptions) -> anyhow::Result<()> {
    let mut session = Session::new(Identity::guest(options.display_name.clone()), config)?;

    info!("Logging in as guest user {:?}", options.display_name);
    session.login().await?;
    let own_id = session.identity().id().unwrap_or_default().to_string();

    session.add_chat_listener(chat_listener(move |message| {
        if message.sender.id == own_id {
            return;
        }
        println!(
            "Received message {:?} from {:?} in space {:?}",
            message.body_text,
            message.sender.name(),
            message.space.title
        );
    }));
    session.start().await?;

    let space = session.get_space_info(&options.space_id).await?;
    info!("Entering space {:?}", space.title);
    session.enter_group_space(&options.space_id).await?;

    info!("Sending a text message to the space");
    session.send_group_chat_message(&options.message).await?;

    info!(
        "Waiting {} seconds for any other messages in the space",
        options.listen_secs
    );
    tokio::time::sleep(Duration::from_secs(options.listen_secs)).await;

    session.leave_group_space().await?;
    session.stop().await?;
    Ok(())
}
