use crate::admin::{AdminCommand, SessionSummary};
use crate::server::{ServerCommand, ServerTx};
use actix_web::error;
use actix_web::web::{self, HttpResponse};
use actix_web::Responder;
use actix_web::Result;

pub fn configure_admin_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin").service(
            web::resource("/session")
                .name("admin_session")
                .route(web::get().to(show_session)),
        ),
    );
}

pub async fn show_session(srv_tx: web::Data<ServerTx>) -> Result<impl Responder> {
    let (tx, rx) = tokio::sync::oneshot::channel::<SessionSummary>();

    srv_tx
        .get_ref()
        .send(ServerCommand::AdminCommand(AdminCommand::GetSessionSummary { tx }))
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    let summary = rx
        .await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))?;

    Ok(HttpResponse::Ok().json(summary))
}
