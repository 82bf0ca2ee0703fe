//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the vendor site and the web
//! archive and run the full listing → detail → record cycle end-to-end.

use gpu_driver_specs::config::{ArchiveConfig, Config, FetchMode};
use gpu_driver_specs::crawler::crawl;
use gpu_driver_specs::output::{JsonLinesSink, MemorySink};
use gpu_driver_specs::GpuRecord;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a listing page from `(href, text)` pairs
fn listing_page(items: &[(&str, &str)]) -> String {
    let blocks: String = items
        .iter()
        .map(|(href, text)| {
            format!(
                r#"<div class="pressItem"><h4><a href="{}">Driver</a></h4><p>{}</p></div>"#,
                href, text
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", blocks)
}

/// Builds a detail page with one GPU list per series
fn detail_page(version: &str, os: &str, date: &str, series: &[(&str, &str)]) -> String {
    let tables: String = series
        .iter()
        .map(|(name, gpus)| format!("<p><b>{}</b><br>{}</p>", name, gpus))
        .collect();
    format!(
        r#"<html><body><table><tr>
        <td class="contentsummaryleft">Version:</td><td class="contentsummaryright">{}</td></tr><tr>
        <td class="contentsummaryleft">Operating System:</td><td class="contentsummaryright">{}</td></tr><tr>
        <td class="contentsummaryleft">Release Date:</td><td class="contentsummaryright">{}</td></tr>
        </table><div id="tab2_content">{}</div></body></html>"#,
        version, os, date, tables
    )
}

/// Creates a test configuration pointing every endpoint at the mock server
fn create_test_config(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::with_base_path(dir.path());
    config.crawler.max_concurrent_fetches = 4;
    config.crawler.request_timeout_secs = 5;
    config.listing.x64_url = format!("{}/drivers/unix/freebsd-x64-archive/", server.uri());
    config.listing.x86_url = format!("{}/drivers/unix/freebsd-x86-archive/", server.uri());
    config.archive = ArchiveConfig {
        availability_url: format!("{}/__wb/sparkline", server.uri()),
        snapshot_prefix: format!("{}/web", server.uri()),
        referer: "https://web.archive.org/".to_string(),
    };
    config
}

async fn mount_page(server: &MockServer, page_path: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_listings(server: &MockServer, x64: String, x86: String) {
    mount_page(server, "/drivers/unix/freebsd-x64-archive/", x64, 1).await;
    mount_page(server, "/drivers/unix/freebsd-x86-archive/", x86, 1).await;
}

fn sorted(mut records: Vec<GpuRecord>) -> Vec<GpuRecord> {
    records.sort_by(|a, b| (&a.version, &a.gpu).cmp(&(&b.version, &b.gpu)));
    records
}

#[tokio::test]
async fn test_full_crawl_both_listings() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listings(
        &server,
        listing_page(&[(
            "/download/driverResults.aspx/77525/en-us",
            "Version: 340.76<br>Operating System: FreeBSD x64<br>Release Date: 2015.01.28",
        )]),
        listing_page(&[("/object/freebsd-x86-313.18-driver", " ")]),
    )
    .await;
    mount_page(
        &server,
        "/download/driverResults.aspx/77525/en-us",
        detail_page(
            "340.76",
            "FreeBSD x64",
            "2015.01.28",
            &[
                ("GeForce 700 Series:", "GeForce GTX 780, GeForce GTX 770"),
                ("Quadro Series:", "Quadro K6000"),
            ],
        ),
        1,
    )
    .await;
    mount_page(
        &server,
        "/object/freebsd-x86-313.18-driver",
        detail_page(
            "313.18",
            "FreeBSD x86",
            "2013.01.17",
            &[("GeForce 600 Series:", "GeForce GTX 680")],
        ),
        1,
    )
    .await;

    let mut sink = MemorySink::new();
    let stats = crawl(create_test_config(&server, &dir), &mut sink)
        .await
        .unwrap();

    assert_eq!(stats.listing_pages, 2);
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.live_fetches, 2);
    assert_eq!(stats.failed_entries, 0);
    assert_eq!(stats.records, 4);

    let records = sorted(sink.records);
    assert_eq!(
        records[0],
        GpuRecord {
            series: "GeForce 600".to_string(),
            gpu: "GeForce GTX 680".to_string(),
            release_date: "2013-01-17T00:00:00Z".to_string(),
            version: "313.18".to_string(),
            os: "FreeBSD".to_string(),
            arch: "i386".to_string(),
        }
    );
    assert_eq!(records[1].gpu, "GeForce GTX 770");
    assert_eq!(records[1].series, "GeForce 700");
    assert_eq!(records[1].arch, "amd64");
    assert_eq!(records[3].gpu, "Quadro K6000");
    assert_eq!(records[3].series, "Quadro");

    let layout = dir.path();
    assert!(layout
        .join("driver_lists/nvidia-freebsd-x64-archive.html")
        .exists());
    assert!(layout
        .join("driver_lists/nvidia-freebsd-x86-archive.html")
        .exists());
    assert!(layout
        .join("driver_specs/nvidia_340.76_freebsd_amd64.html")
        .exists());
    assert!(layout
        .join("driver_specs/nvidia_313.18_freebsd_i386.html")
        .exists());
}

#[tokio::test]
async fn test_second_run_reads_details_from_cache() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let listing = listing_page(&[("/object/freebsd-x64-304.88-driver", " ")]);
    Mock::given(method("GET"))
        .and(path("/drivers/unix/freebsd-x64-archive/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/drivers/unix/freebsd-x86-archive/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[])))
        .expect(2)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/object/freebsd-x64-304.88-driver",
        detail_page(
            "304.88",
            "FreeBSD x64",
            "2013.04.04",
            &[("GeForce 600 Series:", "GeForce GTX 690, GeForce GTX 680")],
        ),
        1,
    )
    .await;

    let mut first = MemorySink::new();
    let first_stats = crawl(create_test_config(&server, &dir), &mut first)
        .await
        .unwrap();
    assert_eq!(first_stats.live_fetches, 1);

    let mut second = MemorySink::new();
    let second_stats = crawl(create_test_config(&server, &dir), &mut second)
        .await
        .unwrap();

    assert_eq!(second_stats.cache_hits, 1);
    assert_eq!(second_stats.network_fetches(), 0);
    assert_eq!(sorted(first.records), sorted(second.records));
}

#[tokio::test]
async fn test_503_detail_is_recovered_from_archive() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listings(
        &server,
        listing_page(&[("/object/freebsd-x64-295.20-driver", " ")]),
        listing_page(&[]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/object/freebsd-x64-295.20-driver"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/__wb/sparkline"))
        .and(query_param("output", "json"))
        .and(query_param("collection", "web"))
        .and(header("referer", "https://web.archive.org/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"first_ts": "20120101000000", "last_ts": "20160312083015"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(
            r"^/web/20160312083015/http.+/object/freebsd-x64-295\.20-driver$",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(
            "295.20",
            "FreeBSD x64",
            "2012.02.13",
            &[("GeForce 500 Series:", "GeForce GTX 590")],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut sink = MemorySink::new();
    let stats = crawl(create_test_config(&server, &dir), &mut sink)
        .await
        .unwrap();

    assert_eq!(stats.archive_fallbacks, 1);
    assert_eq!(stats.failed_entries, 0);
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].release_date, "2012-02-13T00:00:00Z");
    assert!(dir
        .path()
        .join("driver_specs/nvidia_295.20_freebsd_amd64.html")
        .exists());
}

#[tokio::test]
async fn test_failed_detail_does_not_stop_siblings() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listings(
        &server,
        listing_page(&[
            ("/object/freebsd-x64-1.0-driver", " "),
            ("/object/freebsd-x64-2.0-driver", " "),
        ]),
        listing_page(&[("/object/freebsd-x86-3.0-driver", " ")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/object/freebsd-x64-1.0-driver"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/__wb/sparkline"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/object/freebsd-x64-2.0-driver",
        detail_page("2.0", "FreeBSD x64", "2010.01.01", &[("Series A:", "Card 1")]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/object/freebsd-x86-3.0-driver",
        detail_page("3.0", "FreeBSD x86", "2011.01.01", &[("Series B:", "Card 2")]),
        1,
    )
    .await;

    let mut sink = MemorySink::new();
    let stats = crawl(create_test_config(&server, &dir), &mut sink)
        .await
        .unwrap();

    assert_eq!(stats.entries, 3);
    assert_eq!(stats.failed_entries, 1);
    assert_eq!(stats.records, 2);

    let records = sorted(sink.records);
    assert_eq!(records[0].series, "A");
    assert_eq!(records[1].series, "B");
    assert!(!dir
        .path()
        .join("driver_specs/nvidia_1.0_freebsd_amd64.html")
        .exists());
}

#[tokio::test]
async fn test_replay_mode_reads_local_listings() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    std::fs::write(
        dir.path().join("https_www_nvidia.com_en-us_drivers_unix_freebsd-x64-archive.html"),
        listing_page(&[(
            "/object/freebsd-x64-331.38-driver",
            "Version: 331.38<br>Operating System: FreeBSD x64<br>Release Date: 2014.01.13",
        )]),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("https_www_nvidia.com_en-us_drivers_unix_freebsd-x86-archive.html"),
        listing_page(&[]),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path_regex(r"^/drivers/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/object/freebsd-x64-331.38-driver",
        detail_page(
            "331.38",
            "FreeBSD x64",
            "2014.01.13",
            &[("GeForce 700 Series:", "GeForce GTX 780 Ti")],
        ),
        1,
    )
    .await;

    let mut config = create_test_config(&server, &dir);
    config.crawler.mode = FetchMode::Replay;
    config.listing.x64_file =
        Some("https_www_nvidia.com_en-us_drivers_unix_freebsd-x64-archive.html".into());
    config.listing.x86_file =
        Some("https_www_nvidia.com_en-us_drivers_unix_freebsd-x86-archive.html".into());

    let mut sink = MemorySink::new();
    let stats = crawl(config, &mut sink).await.unwrap();

    assert_eq!(stats.listing_pages, 2);
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].gpu, "GeForce GTX 780 Ti");
    assert!(dir
        .path()
        .join("driver_lists/nvidia-freebsd-x64-archive.html")
        .exists());
}

#[tokio::test]
async fn test_placeholder_architectures_get_distinct_cache_keys() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listings(
        &server,
        listing_page(&[]),
        listing_page(&[
            ("/object/FreeBSD_173.14.31", " "),
            ("/object/FreeBSD_96.43.23_display", " "),
        ]),
    )
    .await;
    mount_page(
        &server,
        "/object/FreeBSD_173.14.31",
        detail_page("173.14.31", "FreeBSD x86", "2011.08.05", &[("GeForce 8 Series:", "GeForce 8800 GTX")]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/object/FreeBSD_96.43.23_display",
        detail_page("96.43.23", "FreeBSD x86", "2012.09.04", &[("GeForce4 Series:", "GeForce4 Ti 4600")]),
        1,
    )
    .await;

    let mut sink = MemorySink::new();
    let stats = crawl(create_test_config(&server, &dir), &mut sink)
        .await
        .unwrap();

    assert_eq!(stats.entries, 2);
    assert_eq!(stats.records, 2);
    assert!(dir
        .path()
        .join("driver_specs/nvidia_173.14.31_freebsd_unknown1.html")
        .exists());
    assert!(dir
        .path()
        .join("driver_specs/nvidia_96.43.23_freebsd_unknown2.html")
        .exists());
}

#[tokio::test]
async fn test_duplicate_entries_are_fetched_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let item = (
        "/object/freebsd-x64-325.15-driver",
        "Version: 325.15<br>Operating System: FreeBSD x64<br>Release Date: 2013.08.01",
    );
    mount_listings(&server, listing_page(&[item, item]), listing_page(&[])).await;
    mount_page(
        &server,
        "/object/freebsd-x64-325.15-driver",
        detail_page(
            "325.15",
            "FreeBSD x64",
            "2013.08.01",
            &[("GeForce 700 Series:", "GeForce GTX 760")],
        ),
        1,
    )
    .await;

    let mut sink = MemorySink::new();
    let stats = crawl(create_test_config(&server, &dir), &mut sink)
        .await
        .unwrap();

    assert_eq!(stats.entries, 1);
    assert_eq!(stats.duplicate_entries, 1);
    assert_eq!(sink.records.len(), 1);
}

#[tokio::test]
async fn test_unreachable_listing_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/drivers/unix/freebsd-x64-archive/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/drivers/unix/freebsd-x86-archive/",
        listing_page(&[("/object/freebsd-x86-1.0-driver", " ")]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/object/freebsd-x86-1.0-driver",
        detail_page("1.0", "FreeBSD x86", "2009.01.01", &[("Legacy Series:", "Old Card")]),
        1,
    )
    .await;

    let mut sink = MemorySink::new();
    let stats = crawl(create_test_config(&server, &dir), &mut sink)
        .await
        .unwrap();

    assert_eq!(stats.listing_pages, 1);
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].series, "Legacy");
}

#[tokio::test]
async fn test_records_written_as_json_lines() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listings(
        &server,
        listing_page(&[("/object/freebsd-x64-1.0-driver", " ")]),
        listing_page(&[]),
    )
    .await;
    mount_page(
        &server,
        "/object/freebsd-x64-1.0-driver",
        detail_page(
            "1.0",
            "FreeBSD x64",
            "2009.01.01",
            &[("Series A:", "Card 1, Card 2")],
        ),
        1,
    )
    .await;

    let mut sink = JsonLinesSink::new(Vec::new());
    crawl(create_test_config(&server, &dir), &mut sink)
        .await
        .unwrap();

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert_eq!(line["series"], "A");
        assert_eq!(line["version"], "1.0");
        assert_eq!(line["os"], "FreeBSD");
        assert_eq!(line["arch"], "amd64");
        assert_eq!(line["release_date"], "2009-01-01T00:00:00Z");
    }
}
