use mockito::{Matcher, Server};
use sif::probes::{
    CloudStorageProbe, DirectoryProbe, GitProbe, PortProbe, SubdomainProbe, TakeoverProbe,
};
use sif::resolver::Resolver;
use sif::session::Session;
use sif::sources::{bucket_names, BucketSource, RobotsSource, StaticSource, WordlistSource};
use sif::types::Classification;
use sif::{CandidateSource, Config, Engine, SifError, Target};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use trust_dns_resolver::proto::op::{Message, MessageType, ResponseCode};
use trust_dns_resolver::proto::rr::rdata::CNAME;
use trust_dns_resolver::proto::rr::{Name, RData, Record};
use trust_dns_resolver::proto::serialize::binary::{BinDecodable, BinEncodable};

fn test_config(threads: usize, timeout: Duration) -> Config {
    Config {
        threads,
        timeout,
        show_progress: false,
        ..Config::default()
    }
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_dirlist_reports_only_found_paths() {
    let mut server = Server::new_async().await;
    let _admin = server.mock("GET", "/admin").with_status(200).create_async().await;
    let _backup = server.mock("GET", "/backup").with_status(404).create_async().await;
    let _config = server.mock("GET", "/config").with_status(404).create_async().await;

    let config = test_config(3, Duration::from_secs(5));
    let session = Session::new(&config).unwrap();
    let engine = Engine::new(&config).unwrap();
    let target = Target::parse(&server.url()).unwrap();
    let source = StaticSource::new("dirlist", words(&["admin", "backup", "config"]));

    let set = engine
        .run(&target, &source, Arc::new(DirectoryProbe::dirlist(session)))
        .await
        .unwrap();

    assert_eq!(set.candidates(), HashSet::from(["admin"]));
    assert_eq!(set.probed, 3);
    assert_eq!(set.failed, 0);
}

#[tokio::test]
async fn test_dirlist_keeps_redirects_and_drops_forbidden() {
    let mut server = Server::new_async().await;
    let _moved = server
        .mock("GET", "/old")
        .with_status(301)
        .with_header("location", "/new")
        .create_async()
        .await;
    let _new = server.mock("GET", "/new").with_status(200).create_async().await;
    let _private = server.mock("GET", "/private").with_status(403).create_async().await;

    let config = test_config(2, Duration::from_secs(5));
    let session = Session::new(&config).unwrap();
    let engine = Engine::new(&config).unwrap();
    let target = Target::parse(&server.url()).unwrap();
    let source = StaticSource::new("dirlist", words(&["old", "private"]));

    let set = engine
        .run(&target, &source, Arc::new(DirectoryProbe::dirlist(session)))
        .await
        .unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(set.outcomes[0].candidate, "old");
    assert_eq!(
        set.outcomes[0].classification,
        Classification::Status { code: 301 }
    );
}

#[tokio::test]
async fn test_repeated_runs_match() {
    let mut server = Server::new_async().await;
    let _a = server.mock("GET", "/a").with_status(200).create_async().await;
    let _b = server.mock("GET", "/b").with_status(404).create_async().await;
    let _c = server.mock("GET", "/c").with_status(500).create_async().await;

    let config = test_config(2, Duration::from_secs(5));
    let session = Session::new(&config).unwrap();
    let engine = Engine::new(&config).unwrap();
    let target = Target::parse(&server.url()).unwrap();
    let source = StaticSource::new("dirlist", words(&["a", "b", "c"]));
    let probe = Arc::new(DirectoryProbe::dirlist(session));

    let first = engine.run(&target, &source, Arc::clone(&probe)).await.unwrap();
    let second = engine.run(&target, &source, probe).await.unwrap();

    assert_eq!(first.candidates(), second.candidates());
    assert_eq!(first.candidates(), HashSet::from(["a", "c"]));
}

#[tokio::test]
async fn test_unresponsive_server_is_bounded_by_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let timeout = Duration::from_millis(300);
    let config = test_config(2, timeout);
    let session = Session::new(&config).unwrap();
    let engine = Engine::new(&config).unwrap();
    let target = Target::parse(&format!("http://{}", addr)).unwrap();
    let source = StaticSource::new("dirlist", words(&["slow", "slower"]));

    let started = Instant::now();
    let set = engine
        .run(&target, &source, Arc::new(DirectoryProbe::dirlist(session)))
        .await
        .unwrap();

    assert!(started.elapsed() < timeout + Duration::from_secs(3));
    assert!(set.is_empty());
    assert_eq!(set.probed, 2);
    assert_eq!(set.failed, 2);
}

#[tokio::test]
async fn test_port_probe_finds_listening_port() {
    let open = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open_port = open.local_addr().unwrap().port();

    let mut closed = Vec::new();
    for _ in 0..2 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        closed.push(listener.local_addr().unwrap().port());
    }

    let config = test_config(3, Duration::from_secs(2));
    let engine = Engine::new(&config).unwrap();
    let target = Target::parse("http://127.0.0.1").unwrap();
    let source = StaticSource::new(
        "ports",
        vec![closed[0].to_string(), open_port.to_string(), closed[1].to_string()],
    );

    let set = engine
        .run(&target, &source, Arc::new(PortProbe::new()))
        .await
        .unwrap();

    let expected = open_port.to_string();
    assert_eq!(set.candidates(), HashSet::from([expected.as_str()]));
    assert_eq!(set.resolved(), vec![format!("127.0.0.1:{}", open_port)]);
    drop(open);
}

#[tokio::test]
async fn test_subdomain_probe_reaches_resolved_host() {
    let mut server = Server::new_async().await;
    let _root = server.mock("GET", "/").with_status(200).create_async().await;
    let addr: SocketAddr = server.host_with_port().parse().unwrap();

    let mut config = test_config(2, Duration::from_secs(2));
    config.resolve.insert("www.example.test".to_string(), addr);
    let session = Session::new(&config).unwrap();
    let engine = Engine::new(&config).unwrap();
    let target = Target::parse(&format!("http://example.test:{}", addr.port())).unwrap();
    let source = StaticSource::new("dnslist", words(&["www", "api"]));

    let set = engine
        .run(&target, &source, Arc::new(SubdomainProbe::new(session)))
        .await
        .unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(set.outcomes[0].candidate, "www");
    assert_eq!(
        set.outcomes[0].classification,
        Classification::Reachable {
            scheme: "http".to_string(),
            code: 200
        }
    );
}

#[tokio::test]
async fn test_git_probe_ignores_html_pages() {
    let mut server = Server::new_async().await;
    let _head = server
        .mock("GET", "/.git/HEAD")
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body("ref: refs/heads/main\n")
        .create_async()
        .await;
    let _config = server
        .mock("GET", "/.git/config")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body("<html>not here</html>")
        .create_async()
        .await;
    let _index = server.mock("GET", "/.git/index").with_status(404).create_async().await;

    let config = test_config(2, Duration::from_secs(5));
    let session = Session::new(&config).unwrap();
    let engine = Engine::new(&config).unwrap();
    let target = Target::parse(&server.url()).unwrap();
    let source = StaticSource::new("git", words(&[".git/HEAD", ".git/config", ".git/index"]));

    let set = engine
        .run(&target, &source, Arc::new(GitProbe::new(session)))
        .await
        .unwrap();

    assert_eq!(set.candidates(), HashSet::from([".git/HEAD"]));
}

#[tokio::test]
async fn test_robots_paths_follow_moved_file() {
    let mut server = Server::new_async().await;
    let _moved = server
        .mock("GET", "/robots.txt")
        .with_status(301)
        .with_header("location", "/seo/robots.txt")
        .create_async()
        .await;
    let _robots = server
        .mock("GET", "/seo/robots.txt")
        .with_status(200)
        .with_body(concat!(
            "User-agent: *\n",
            "Disallow: /secret\n",
            "Disallow: /missing\n",
            "# note\n",
            "Sitemap: https://x/sitemap.xml\n",
        ))
        .create_async()
        .await;
    let _secret = server.mock("GET", "/secret").with_status(403).create_async().await;
    let _missing = server.mock("GET", "/missing").with_status(404).create_async().await;

    let config = test_config(2, Duration::from_secs(5));
    let session = Session::new(&config).unwrap();
    let engine = Engine::new(&config).unwrap();
    let target = Target::parse(&server.url()).unwrap();

    let source = RobotsSource::new(target.clone(), session.clone());
    assert_eq!(source.load().await.unwrap(), words(&["/secret", "/missing"]));

    let set = engine
        .run(&target, &source, Arc::new(DirectoryProbe::robots(session)))
        .await
        .unwrap();

    assert_eq!(set.candidates(), HashSet::from(["/secret"]));
}

#[tokio::test]
async fn test_missing_robots_is_empty() {
    let mut server = Server::new_async().await;
    let _robots = server.mock("GET", "/robots.txt").with_status(404).create_async().await;

    let config = test_config(1, Duration::from_secs(5));
    let session = Session::new(&config).unwrap();
    let target = Target::parse(&server.url()).unwrap();

    let source = RobotsSource::new(target, session);
    assert!(source.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remote_wordlist_error_status_is_load_failure() {
    let mut server = Server::new_async().await;
    let _list = server.mock("GET", "/lists/git.txt").with_status(500).create_async().await;

    let config = test_config(1, Duration::from_secs(5));
    let session = Session::new(&config).unwrap();
    let source = WordlistSource::new("git", format!("{}/lists/git.txt", server.url()), session);

    let result = source.load().await;
    assert!(matches!(result, Err(SifError::Load { .. })));
}

#[tokio::test]
async fn test_remote_wordlist_skips_comments() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("GET", "/lists/git.txt")
        .with_status(200)
        .with_body("# git files\n.git/HEAD\n\n  .git/config  \n")
        .create_async()
        .await;

    let config = test_config(1, Duration::from_secs(5));
    let session = Session::new(&config).unwrap();
    let source = WordlistSource::new("git", format!("{}/lists/git.txt", server.url()), session);

    assert_eq!(source.load().await.unwrap(), words(&[".git/HEAD", ".git/config"]));
}

#[tokio::test]
async fn test_slow_wordlist_download_outlives_request_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 12\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(800)).await;
            socket.write_all(b"admin\nbackup").await.unwrap();
            socket.flush().await.unwrap();
        }
    });

    let config = test_config(1, Duration::from_millis(300));
    let session = Session::new(&config).unwrap();
    let source = WordlistSource::new("dirlist", format!("http://{}/list.txt", addr), session);

    assert_eq!(source.load().await.unwrap(), words(&["admin", "backup"]));
}

/// Answers every query with a CNAME to `alias`.
async fn spawn_cname_server(alias: &str) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let alias = Name::from_ascii(alias).unwrap();

    tokio::spawn(async move {
        let mut buf = [0u8; 1024];
        while let Ok((len, peer)) = socket.recv_from(&mut buf).await {
            let Ok(request) = Message::from_bytes(&buf[..len]) else {
                continue;
            };

            let mut response = Message::new();
            response
                .set_id(request.id())
                .set_message_type(MessageType::Response)
                .set_op_code(request.op_code())
                .set_recursion_desired(request.recursion_desired())
                .set_recursion_available(true)
                .set_response_code(ResponseCode::NoError);
            for query in request.queries() {
                response.add_query(query.clone());
                response.add_answer(Record::from_rdata(
                    query.name().clone(),
                    60,
                    RData::CNAME(CNAME(alias.clone())),
                ));
            }

            if let Ok(bytes) = response.to_bytes() {
                let _ = socket.send_to(&bytes, peer).await;
            }
        }
    });

    addr
}

#[tokio::test]
async fn test_takeover_fingerprint_behind_redirect() {
    let mut server = Server::new_async().await;
    let _dead = server
        .mock("GET", "/")
        .match_header("host", Matcher::Regex(r"^dead\.example\.test(:\d+)?$".to_string()))
        .with_status(301)
        .with_header("location", "/landing")
        .create_async()
        .await;
    let _live = server
        .mock("GET", "/")
        .match_header("host", Matcher::Regex(r"^live\.example\.test(:\d+)?$".to_string()))
        .with_status(200)
        .with_body("<html>welcome</html>")
        .create_async()
        .await;
    let _landing = server
        .mock("GET", "/landing")
        .with_status(404)
        .with_body("<html><body>No such app</body></html>")
        .create_async()
        .await;
    let addr: SocketAddr = server.host_with_port().parse().unwrap();

    let mut config = test_config(2, Duration::from_secs(5));
    config.resolve.insert("dead.example.test".to_string(), addr);
    config.resolve.insert("live.example.test".to_string(), addr);
    config.nameservers = vec!["127.0.0.1:53".to_string()];
    let session = Session::new(&config).unwrap();
    let resolver = Resolver::new(&config).unwrap();
    let engine = Engine::new(&config).unwrap();
    let target = Target::parse(&format!("http://example.test:{}", addr.port())).unwrap();

    let dead = format!("dead.example.test:{}", addr.port());
    let live = format!("live.example.test:{}", addr.port());
    let source = StaticSource::new("takeover", vec![dead.clone(), live]);

    let set = engine
        .run(&target, &source, Arc::new(TakeoverProbe::new(session, resolver)))
        .await
        .unwrap();

    assert_eq!(set.probed, 2);
    assert_eq!(set.failed, 0);
    assert_eq!(set.candidates(), HashSet::from([dead.as_str()]));
    assert_eq!(
        set.outcomes[0].classification,
        Classification::Takeover {
            service: "Heroku".to_string()
        }
    );
}

#[tokio::test]
async fn test_takeover_reports_dangling_cname() {
    let dns = spawn_cname_server("gone-app.herokuapp.com.").await;

    // Generous timeout: the unresolvable host goes through the system resolver first
    let mut config = test_config(1, Duration::from_secs(15));
    config.nameservers = vec![dns.to_string()];
    let session = Session::new(&config).unwrap();
    let resolver = Resolver::new(&config).unwrap();
    let engine = Engine::new(&config).unwrap();
    let target = Target::parse("http://example.invalid").unwrap();
    let source = StaticSource::new("takeover", words(&["gone.example.invalid"]));

    let set = engine
        .run(&target, &source, Arc::new(TakeoverProbe::new(session, resolver)))
        .await
        .unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(
        set.outcomes[0].classification,
        Classification::Takeover {
            service: "Dangling CNAME".to_string()
        }
    );
    assert_eq!(set.outcomes[0].resolved, "gone-app.herokuapp.com");
}

#[tokio::test]
async fn test_cloud_storage_finds_public_bucket() {
    let mut server = Server::new_async().await;
    let _public = server
        .mock("GET", "/")
        .match_header("host", Matcher::Regex(r"^acme\.s3\.test(:\d+)?$".to_string()))
        .with_status(200)
        .with_body("<ListBucketResult></ListBucketResult>")
        .create_async()
        .await;
    let _private = server
        .mock("GET", "/")
        .match_header(
            "host",
            Matcher::Regex(
                r"^(acme-s3|s3-acme|acme-io|io-acme|io|io-s3|s3-io)\.s3\.test(:\d+)?$".to_string(),
            ),
        )
        .with_status(403)
        .create_async()
        .await;
    let addr: SocketAddr = server.host_with_port().parse().unwrap();

    let target = Target::parse("https://acme.io").unwrap();
    let mut config = test_config(3, Duration::from_secs(5));
    for bucket in bucket_names(target.host()) {
        config.resolve.insert(format!("{}.s3.test", bucket), addr);
    }
    let session = Session::new(&config).unwrap();
    let engine = Engine::new(&config).unwrap();
    let endpoint = format!("http://s3.test:{}", addr.port());
    let probe = CloudStorageProbe::new(session, &endpoint).unwrap();

    let set = engine
        .run(&target, &BucketSource::new(target.clone()), Arc::new(probe))
        .await
        .unwrap();

    assert_eq!(set.probed, 8);
    assert_eq!(set.failed, 0);
    assert_eq!(set.candidates(), HashSet::from(["acme"]));
    assert_eq!(
        set.resolved(),
        vec![format!("http://acme.s3.test:{}", addr.port())]
    );
}
