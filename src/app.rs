use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use tracing_actix_web::TracingLogger;

use crate::context::Context;
use crate::controller::{destination, reminders, users};

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().finish()
}

/// Run the application on a specified TCP listener
pub fn run(listener: TcpListener, context: Context) -> anyhow::Result<Server> {
    // Wrap application data
    let context = web::Data::new(context);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(context.clone())
            .service(health_check)
            .service(reminders::scope())
            .service(users::scope())
            .service(destination::scope())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
