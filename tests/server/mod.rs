use actix_web::{App, HttpResponse, HttpServer, web};

#[allow(dead_code)]
pub const GOOD_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Handmade Ceramic Mugs and Bowls for Everyday Use</title>
    <meta name="description" content="Browse our collection of handmade ceramic mugs, bowls and plates, glazed in small batches and fired in our own studio kiln.">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="canonical" href="/">
    <meta property="og:title" content="Handmade Ceramics">
    <meta name="twitter:card" content="summary">
    <script type="application/ld+json">{"@context": "https://schema.org", "@type": "Store"}</script>
</head>
<body>
    <nav><a href="/ok">Shop all</a></nav>
    <main>
        <h1>Handmade Ceramics</h1>
        <img src="/mug.jpg" alt="A blue mug">
        <p><a href="/ok">Read our story</a></p>
    </main>
</body>
</html>"#;

#[allow(dead_code)]
pub const LINKS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Links</title></head>
<body>
    <main>
        <a href="/ok">Working page</a>
        <a href="/missing">Missing page</a>
        <a href="/moved">Moved page</a>
        <a href="/get-only">Get only</a>
        <a href="mailto:team@example.com">Mail us</a>
        <a href="javascript:void(0)">Nothing</a>
    </main>
    <footer><a href="http://127.0.0.1:1/unreachable">Partner</a></footer>
</body>
</html>"#;

fn html(body: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .append_header(("X-Content-Type-Options", "nosniff"))
        .append_header(("X-Frame-Options", "DENY"))
        .append_header(("Referrer-Policy", "no-referrer"))
        .append_header(("Content-Security-Policy", "default-src 'self'"))
        .body(body)
}

/// Starts a server on an ephemeral port and returns its base URL.
///
/// The site has a robots.txt but no sitemap.xml.
#[allow(dead_code)]
pub async fn get_test_server_url() -> String {
    let http_server = HttpServer::new(|| {
        App::new()
            .route("/", web::get().to(|| async { html(GOOD_PAGE) }))
            .route("/links", web::get().to(|| async { html(LINKS_PAGE) }))
            .route(
                "/bare",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/html")
                        .body("<html><body><p>Nothing to see</p></body></html>")
                }),
            )
            .route(
                "/gone",
                web::get().to(|| async { HttpResponse::Gone().body("Gone") }),
            )
            .route("/ok", web::route().to(|| async { HttpResponse::Ok().body("OK") }))
            .route(
                "/missing",
                web::route().to(|| async { HttpResponse::NotFound().body("Not Found") }),
            )
            .route(
                "/moved",
                web::route().to(|| async {
                    HttpResponse::MovedPermanently()
                        .append_header(("Location", "/ok"))
                        .finish()
                }),
            )
            .service(
                web::resource("/get-only")
                    .route(web::head().to(|| async { HttpResponse::MethodNotAllowed().finish() }))
                    .route(web::get().to(|| async { HttpResponse::Ok().body("OK") })),
            )
            .route(
                "/robots.txt",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/plain")
                        .body("User-agent: *\nDisallow: /private\nSitemap: /sitemap.xml\n")
                }),
            )
    })
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind test server");

    let addr = http_server
        .addrs()
        .first()
        .cloned()
        .expect("No address bound");
    let url = format!("http://{}", addr);

    let app_server = http_server.run();

    tokio::spawn(async move {
        if let Err(e) = app_server.await {
            eprintln!("Test server error: {}", e);
        }
    });

    url
}
