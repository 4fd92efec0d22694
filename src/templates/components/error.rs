use crate::errors::ServerError;
use astra::{Body, Response, ResponseBuilder};
use maud::{html, Markup, DOCTYPE};

/// Convert a ServerError into a proper HTML response page
pub fn html_error_response(err: ServerError) -> Response {
    match err {
        ServerError::NotFound => render_error(404, "Página não encontrada"),

        ServerError::BadRequest(msg) => render_error(400, &msg),

        ServerError::InternalError => render_error(500, "Erro interno do servidor"),
    }
}

/// Inline banner shown above the grid when a page fetch failed.
pub fn error_banner(message: &str) -> Markup {
    html! {
        div class="alert alert-error" role="alert" {
            p { (message) }
            p class="microcopy" { "Role a página ou altere um filtro para tentar novamente." }
        }
    }
}

fn render_error(status: u16, message: &str) -> Response {
    let page = html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="utf-8";
                title { "Erro " (status) }
                link rel="stylesheet" href="/static/main.css";
            }
            body class="error-page" {
                h1 { "Erro " (status) }
                p { (message) }
                p { a href="/imoveis" { "← Voltar para os imóveis" } }
            }
        }
    };

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::TEXT_HTML_UTF_8.as_ref())
        .body(Body::from(page.into_string()))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
