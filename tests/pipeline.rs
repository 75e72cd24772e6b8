//! Integration tests for the page pipeline and the job driver.
//!
//! pdfium and S3 are replaced by in-memory doubles so these run everywhere:
//!   cargo test --test pipeline

use async_trait::async_trait;
use edgequake_pdf2jpeg::{
    ConversionConfig, DocumentSource, ImageEncoder, JobDriver, ObjectStore, PageConverter,
    PageDocument, PageFailureCollector, PageStage, Pdf2JpegError, ProgressCallback, RecordStatus,
    S3Event, StoreProvider,
};
use image::DynamicImage;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Doubles ──────────────────────────────────────────────────────────────────

/// Counts page units between the start of their render and the end of their
/// upload.
#[derive(Default)]
struct UnitGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl UnitGauge {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A document whose page `n` renders as an `n`×1 raster.
#[derive(Default)]
struct FakeDocument {
    pages: usize,
    fail_render: HashSet<usize>,
    panic_render: Option<usize>,
    slow_page: Option<(usize, Duration)>,
    render_delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    units: Option<Arc<UnitGauge>>,
    requested_sizes: Mutex<HashSet<u32>>,
}

impl FakeDocument {
    fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }
}

impl PageDocument for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn render_page(
        &self,
        index: usize,
        max_rendered_pixels: u32,
    ) -> Result<DynamicImage, Pdf2JpegError> {
        let page = index + 1;
        if let Some(units) = &self.units {
            units.enter();
        }
        self.requested_sizes
            .lock()
            .unwrap()
            .insert(max_rendered_pixels);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let mut delay = self.render_delay;
        if let Some((slow, d)) = self.slow_page {
            if slow == page {
                delay = d;
            }
        }
        std::thread::sleep(delay);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic_render == Some(page) {
            panic!("renderer crashed on page {page}");
        }
        if self.fail_render.contains(&page) {
            return Err(Pdf2JpegError::RasterisationFailed {
                index,
                detail: "broken content stream".into(),
            });
        }
        Ok(DynamicImage::new_rgb8(page as u32, 1))
    }
}

/// Writes the raster width as the payload; fails for chosen widths (= pages).
#[derive(Default)]
struct FakeEncoder {
    fail_pages: HashSet<u32>,
}

impl ImageEncoder for FakeEncoder {
    fn content_type(&self) -> &'static str {
        "image/test"
    }

    fn encode(&self, raster: &DynamicImage, quality: u8) -> Result<Vec<u8>, Pdf2JpegError> {
        if self.fail_pages.contains(&raster.width()) {
            return Err(Pdf2JpegError::EncodeFailed {
                detail: "quantisation table overflow".into(),
            });
        }
        Ok(vec![raster.width() as u8, quality])
    }
}

#[derive(Default)]
struct MemoryStore {
    bucket: String,
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    fail_upload: HashSet<String>,
    panic_upload: Option<String>,
    fail_download: bool,
    upload_delay: Duration,
    units: Option<Arc<UnitGauge>>,
}

impl MemoryStore {
    fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            ..Default::default()
        }
    }

    fn put(&self, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body.to_vec(), "application/pdf".into()));
    }

    fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, Pdf2JpegError> {
        if self.fail_download {
            return Err(Pdf2JpegError::DownloadFailed {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                reason: "access denied".into(),
            });
        }
        self.get(key)
            .map(|(body, _)| body)
            .ok_or_else(|| Pdf2JpegError::DownloadFailed {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                reason: "no such key".into(),
            })
    }

    async fn upload(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), Pdf2JpegError> {
        if !self.upload_delay.is_zero() {
            tokio::time::sleep(self.upload_delay).await;
        }
        if let Some(units) = &self.units {
            units.leave();
        }
        if self.panic_upload.as_deref() == Some(key) {
            panic!("connection pool poisoned");
        }
        if self.fail_upload.contains(key) {
            return Err(Pdf2JpegError::UploadFailed {
                key: key.to_string(),
                reason: "503 slow down".into(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct MemoryStores {
    buckets: Mutex<HashMap<String, Arc<MemoryStore>>>,
}

impl MemoryStores {
    fn insert(&self, store: MemoryStore) -> Arc<MemoryStore> {
        let store = Arc::new(store);
        self.buckets
            .lock()
            .unwrap()
            .insert(store.bucket.clone(), Arc::clone(&store));
        store
    }

    fn bucket(&self, name: &str) -> Arc<MemoryStore> {
        Arc::clone(
            self.buckets
                .lock()
                .unwrap()
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(MemoryStore::new(name))),
        )
    }
}

impl StoreProvider for MemoryStores {
    fn store_for(&self, bucket: &str) -> Arc<dyn ObjectStore> {
        self.bucket(bucket)
    }
}

/// Opens any bytes as a document with `pages` pages.
struct FakeSource {
    pages: usize,
    opened: AtomicUsize,
    passwords: Mutex<Vec<Option<String>>>,
}

impl FakeSource {
    fn new(pages: usize) -> Arc<Self> {
        Arc::new(Self {
            pages,
            opened: AtomicUsize::new(0),
            passwords: Mutex::new(Vec::new()),
        })
    }
}

impl DocumentSource for FakeSource {
    fn open(
        &self,
        bytes: Vec<u8>,
        password: Option<&str>,
    ) -> Result<Arc<dyn PageDocument>, Pdf2JpegError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.passwords
            .lock()
            .unwrap()
            .push(password.map(str::to_string));
        if bytes.windows(7).any(|w| w == b"garbage") {
            return Err(Pdf2JpegError::CorruptPdf {
                detail: "xref table not found".into(),
            });
        }
        Ok(Arc::new(FakeDocument::with_pages(self.pages)))
    }
}

const PDF_BYTES: &[u8] = b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n%%EOF";

fn converter(store: Arc<MemoryStore>, config: &ConversionConfig) -> PageConverter {
    PageConverter::new(Arc::new(FakeEncoder::default()), store, config)
}

/// Fail the test instead of hanging when a conversion deadlocks.
async fn within<T>(fut: impl std::future::Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(10), fut)
        .await
        .expect("conversion did not finish")
}

// ── PageConverter ────────────────────────────────────────────────────────────

#[tokio::test]
async fn zero_page_document_uploads_nothing() {
    let store = Arc::new(MemoryStore::new("inbox"));
    let summary = within(
        converter(Arc::clone(&store), &ConversionConfig::default())
            .convert(Arc::new(FakeDocument::with_pages(0)), "empty"),
    )
    .await
    .unwrap();

    assert_eq!(summary.total_pages, 0);
    assert!(summary.uploaded.is_empty());
    assert!(summary.failures.is_empty());
    assert!(summary.is_complete());
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn every_page_is_stored_under_its_own_key() {
    let store = Arc::new(MemoryStore::new("inbox"));
    let summary = within(
        converter(Arc::clone(&store), &ConversionConfig::default())
            .convert(Arc::new(FakeDocument::with_pages(5)), "reports/q3"),
    )
    .await
    .unwrap();

    let expected: Vec<String> = (1..=5).map(|n| format!("reports/q3-{n}.jpeg")).collect();
    assert_eq!(summary.uploaded, expected);
    assert_eq!(store.keys(), expected);
    assert!(summary.is_complete());

    // Page n went through the encoder as an n-pixel-wide raster.
    let (body, content_type) = store.get("reports/q3-4.jpeg").unwrap();
    assert_eq!(body, vec![4, 75]);
    assert_eq!(content_type, "image/test");
}

#[tokio::test]
async fn render_failure_is_isolated_to_its_page() {
    let store = Arc::new(MemoryStore::new("inbox"));
    let document = FakeDocument {
        fail_render: HashSet::from([2]),
        ..FakeDocument::with_pages(3)
    };
    let summary = within(
        converter(Arc::clone(&store), &ConversionConfig::default())
            .convert(Arc::new(document), "doc"),
    )
    .await
    .unwrap();

    assert_eq!(store.keys(), vec!["doc-1.jpeg", "doc-3.jpeg"]);
    assert_eq!(summary.processed_pages(), 2);
    assert_eq!(summary.failed_pages(), 1);
    let failure = &summary.failures[0];
    assert_eq!(failure.page(), 2);
    assert_eq!(failure.key(), "doc-2.jpeg");
    assert_eq!(failure.stage(), PageStage::Render);
    assert!(!summary.is_complete());
}

#[tokio::test]
async fn failed_pages_release_their_slot() {
    // The first `concurrency` pages all fail; later pages only get a slot if
    // those permits come back.
    let store = Arc::new(MemoryStore::new("inbox"));
    let document = FakeDocument {
        fail_render: HashSet::from([1, 2, 3, 4]),
        ..FakeDocument::with_pages(10)
    };
    let summary = within(
        converter(Arc::clone(&store), &ConversionConfig::default())
            .convert(Arc::new(document), "doc"),
    )
    .await
    .unwrap();

    assert_eq!(summary.failed_pages(), 4);
    assert_eq!(summary.processed_pages(), 6);
    assert_eq!(store.keys().len(), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn at_most_four_pages_in_flight() {
    let store = Arc::new(MemoryStore::new("inbox"));
    let document = Arc::new(FakeDocument {
        render_delay: Duration::from_millis(25),
        ..FakeDocument::with_pages(16)
    });
    let summary = within(
        converter(Arc::clone(&store), &ConversionConfig::default())
            .convert(Arc::clone(&document) as Arc<dyn PageDocument>, "doc"),
    )
    .await
    .unwrap();

    assert_eq!(summary.processed_pages(), 16);
    let max = document.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 4, "saw {max} pages in flight");
    assert!(max >= 2, "pages never overlapped");
    assert_eq!(document.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn slot_is_held_until_upload_finishes() {
    // Rendering is quick and uploading slow: a unit that gave its slot back
    // before uploading would let more than four uploads pile up.
    let units = Arc::new(UnitGauge::default());
    let store = Arc::new(MemoryStore {
        upload_delay: Duration::from_millis(30),
        units: Some(Arc::clone(&units)),
        ..MemoryStore::new("inbox")
    });
    let document = FakeDocument {
        render_delay: Duration::from_millis(1),
        units: Some(Arc::clone(&units)),
        ..FakeDocument::with_pages(24)
    };
    let summary = within(
        converter(Arc::clone(&store), &ConversionConfig::default())
            .convert(Arc::new(document), "doc"),
    )
    .await
    .unwrap();

    assert_eq!(summary.processed_pages(), 24);
    let peak = units.peak.load(Ordering::SeqCst);
    assert!(peak <= 4, "saw {peak} units between render and upload");
    assert!(peak >= 2, "units never overlapped");
    assert_eq!(units.current.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrency_setting_is_honoured() {
    let config = ConversionConfig::builder().concurrency(1).build().unwrap();
    let units = Arc::new(UnitGauge::default());
    let store = Arc::new(MemoryStore {
        upload_delay: Duration::from_millis(10),
        units: Some(Arc::clone(&units)),
        ..MemoryStore::new("inbox")
    });
    let document = Arc::new(FakeDocument {
        render_delay: Duration::from_millis(5),
        units: Some(Arc::clone(&units)),
        ..FakeDocument::with_pages(6)
    });
    within(
        converter(Arc::clone(&store), &config)
            .convert(Arc::clone(&document) as Arc<dyn PageDocument>, "doc"),
    )
    .await
    .unwrap();

    assert_eq!(document.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(units.peak.load(Ordering::SeqCst), 1);
    assert_eq!(units.current.load(Ordering::SeqCst), 0);
    assert_eq!(store.keys().len(), 6);
}

#[tokio::test]
async fn zero_concurrency_set_on_the_field_still_converts() {
    let config = ConversionConfig {
        concurrency: 0,
        ..ConversionConfig::default()
    };
    let store = Arc::new(MemoryStore::new("inbox"));
    let summary = within(
        converter(Arc::clone(&store), &config).convert(Arc::new(FakeDocument::with_pages(3)), "doc"),
    )
    .await
    .unwrap();

    assert_eq!(summary.processed_pages(), 3);
}

#[tokio::test]
async fn render_size_cap_comes_from_config() {
    let config = ConversionConfig::builder()
        .max_rendered_pixels(640)
        .build()
        .unwrap();
    let store = Arc::new(MemoryStore::new("inbox"));
    let document = Arc::new(FakeDocument::with_pages(3));
    within(
        converter(Arc::clone(&store), &config)
            .convert(Arc::clone(&document) as Arc<dyn PageDocument>, "doc"),
    )
    .await
    .unwrap();

    assert_eq!(*document.requested_sizes.lock().unwrap(), HashSet::from([640]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn convert_waits_for_the_slowest_page() {
    let store = Arc::new(MemoryStore {
        upload_delay: Duration::from_millis(5),
        ..MemoryStore::new("inbox")
    });
    let document = FakeDocument {
        slow_page: Some((1, Duration::from_millis(300))),
        ..FakeDocument::with_pages(6)
    };
    let summary = within(
        converter(Arc::clone(&store), &ConversionConfig::default())
            .convert(Arc::new(document), "doc"),
    )
    .await
    .unwrap();

    assert!(store.get("doc-1.jpeg").is_some());
    assert_eq!(summary.uploaded.first().map(String::as_str), Some("doc-1.jpeg"));
    assert_eq!(summary.processed_pages(), 6);
}

#[tokio::test]
async fn encode_and_upload_failures_are_reported_per_page() {
    let store = Arc::new(MemoryStore {
        fail_upload: HashSet::from(["doc-4.jpeg".to_string()]),
        ..MemoryStore::new("inbox")
    });
    let encoder = Arc::new(FakeEncoder {
        fail_pages: HashSet::from([2]),
    });
    let collector = Arc::new(PageFailureCollector::default());
    let config = ConversionConfig::builder()
        .progress_callback(Arc::clone(&collector) as ProgressCallback)
        .build()
        .unwrap();

    let summary = within(
        PageConverter::new(encoder, Arc::clone(&store) as Arc<dyn ObjectStore>, &config)
            .convert(Arc::new(FakeDocument::with_pages(5)), "doc"),
    )
    .await
    .unwrap();

    assert_eq!(store.keys(), vec!["doc-1.jpeg", "doc-3.jpeg", "doc-5.jpeg"]);
    let stages: Vec<(usize, PageStage)> = summary
        .failures
        .iter()
        .map(|f| (f.page(), f.stage()))
        .collect();
    assert_eq!(stages, vec![(2, PageStage::Encode), (4, PageStage::Upload)]);

    let mut reported = collector.take();
    reported.sort_by_key(|f| f.page());
    assert_eq!(reported, summary.failures);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_pages_do_not_take_down_the_document() {
    let store = Arc::new(MemoryStore {
        panic_upload: Some("doc-3.jpeg".to_string()),
        ..MemoryStore::new("inbox")
    });
    let document = FakeDocument {
        panic_render: Some(1),
        ..FakeDocument::with_pages(4)
    };
    let summary = within(
        converter(Arc::clone(&store), &ConversionConfig::default())
            .convert(Arc::new(document), "doc"),
    )
    .await
    .unwrap();

    assert_eq!(store.keys(), vec!["doc-2.jpeg", "doc-4.jpeg"]);
    let panicked: Vec<usize> = summary
        .failures
        .iter()
        .filter(|f| f.stage() == PageStage::Panic)
        .map(|f| f.page())
        .collect();
    assert_eq!(panicked, vec![1, 3]);
}

// ── JobDriver ────────────────────────────────────────────────────────────────

fn driver(source: Arc<FakeSource>, stores: Arc<MemoryStores>, config: ConversionConfig) -> JobDriver {
    JobDriver::new(source, stores, config).with_encoder(Arc::new(FakeEncoder::default()))
}

#[tokio::test]
async fn event_converts_document_next_to_source() {
    let stores = Arc::new(MemoryStores::default());
    stores.bucket("inbox").put("scans/Q3 summary.pdf", PDF_BYTES);
    let source = FakeSource::new(3);

    let event = S3Event::single("inbox", "scans/Q3 summary.pdf");
    let outcome = within(
        driver(Arc::clone(&source), Arc::clone(&stores), ConversionConfig::default())
            .handle_event(&event),
    )
    .await;

    assert_eq!(outcome.converted(), 1);
    assert_eq!(outcome.failed(), 0);
    assert_eq!(outcome.records[0].key, "scans/Q3 summary.pdf");
    assert_eq!(
        stores.bucket("inbox").keys(),
        vec![
            "scans/Q3 summary-1.jpeg",
            "scans/Q3 summary-2.jpeg",
            "scans/Q3 summary-3.jpeg",
            "scans/Q3 summary.pdf",
        ]
    );
}

#[tokio::test]
async fn url_encoded_key_from_notification_is_decoded() {
    let stores = Arc::new(MemoryStores::default());
    stores.bucket("inbox").put("a b(1).pdf", PDF_BYTES);
    let payload = r#"{"Records":[{"eventName":"ObjectCreated:Put","s3":{
        "bucket":{"name":"inbox"},"object":{"key":"a+b%281%29.pdf"}}}]}"#;
    let event = S3Event::from_json(payload).unwrap();

    let outcome = within(
        driver(FakeSource::new(1), Arc::clone(&stores), ConversionConfig::default())
            .handle_event(&event),
    )
    .await;

    assert_eq!(outcome.converted(), 1);
    assert!(stores.bucket("inbox").get("a b(1)-1.jpeg").is_some());
}

#[tokio::test]
async fn non_pdf_keys_and_deletions_are_skipped() {
    let stores = Arc::new(MemoryStores::default());
    let source = FakeSource::new(2);
    let payload = r#"{"Records":[
        {"eventName":"ObjectCreated:Put","s3":{"bucket":{"name":"inbox"},"object":{"key":"doc-1.jpeg"}}},
        {"eventName":"ObjectRemoved:Delete","s3":{"bucket":{"name":"inbox"},"object":{"key":"old.pdf"}}}
    ]}"#;
    let event = S3Event::from_json(payload).unwrap();

    let outcome = within(
        driver(Arc::clone(&source), Arc::clone(&stores), ConversionConfig::default())
            .handle_event(&event),
    )
    .await;

    assert_eq!(outcome.skipped(), 2);
    assert_eq!(source.opened.load(Ordering::SeqCst), 0);
    assert!(stores.bucket("inbox").keys().is_empty());
}

#[tokio::test]
async fn job_level_failures_are_recorded_and_later_records_still_run() {
    let stores = Arc::new(MemoryStores::default());
    stores.insert(MemoryStore {
        fail_download: true,
        ..MemoryStore::new("locked")
    });
    let inbox = stores.bucket("inbox");
    inbox.put("empty.pdf", b"");
    inbox.put("fake.pdf", b"PK\x03\x04 zip archive");
    inbox.put("corrupt.pdf", b"%PDF-1.4 garbage");
    inbox.put("good.pdf", PDF_BYTES);

    let mut event = S3Event::single("locked", "secret.pdf");
    for key in ["empty.pdf", "fake.pdf", "corrupt.pdf", "good.pdf"] {
        event
            .records
            .extend(S3Event::single("inbox", key).records);
    }

    let source = FakeSource::new(2);
    let outcome = within(
        driver(Arc::clone(&source), Arc::clone(&stores), ConversionConfig::default())
            .handle_event(&event),
    )
    .await;

    assert_eq!(outcome.records.len(), 5);
    assert_eq!(outcome.failed(), 4);
    assert_eq!(outcome.converted(), 1);

    let errors: Vec<&str> = outcome
        .records
        .iter()
        .filter_map(|r| match &r.status {
            RecordStatus::Failed { error } => Some(error.as_str()),
            _ => None,
        })
        .collect();
    assert!(errors[0].contains("access denied"), "{}", errors[0]);
    assert!(errors[1].contains("empty"), "{}", errors[1]);
    assert!(errors[2].contains("not a valid PDF"), "{}", errors[2]);
    assert!(errors[3].contains("xref"), "{}", errors[3]);

    // Only bytes that passed validation reached the renderer.
    assert_eq!(source.opened.load(Ordering::SeqCst), 2);
    assert_eq!(outcome.records[4].key, "good.pdf");
    assert!(inbox.get("good-2.jpeg").is_some());
    assert!(inbox.get("corrupt-1.jpeg").is_none());
}

#[tokio::test]
async fn records_are_converted_in_event_order_across_buckets() {
    let stores = Arc::new(MemoryStores::default());
    stores.bucket("a").put("one.pdf", PDF_BYTES);
    stores.bucket("b").put("two.pdf", PDF_BYTES);

    let mut event = S3Event::single("a", "one.pdf");
    event.records.extend(S3Event::single("b", "two.pdf").records);

    let outcome = within(
        driver(FakeSource::new(2), Arc::clone(&stores), ConversionConfig::default())
            .handle_event(&event),
    )
    .await;

    let order: Vec<(&str, &str)> = outcome
        .records
        .iter()
        .map(|r| (r.bucket.as_str(), r.key.as_str()))
        .collect();
    assert_eq!(order, vec![("a", "one.pdf"), ("b", "two.pdf")]);
    assert_eq!(stores.bucket("a").keys(), vec!["one-1.jpeg", "one-2.jpeg", "one.pdf"]);
    assert_eq!(stores.bucket("b").keys(), vec!["two-1.jpeg", "two-2.jpeg", "two.pdf"]);
}

#[tokio::test]
async fn password_is_forwarded_to_the_document_source() {
    let stores = Arc::new(MemoryStores::default());
    stores.bucket("inbox").put("locked.pdf", PDF_BYTES);
    let source = FakeSource::new(1);
    let config = ConversionConfig::builder().password("hunter2").build().unwrap();

    within(
        driver(Arc::clone(&source), stores, config)
            .handle_event(&S3Event::single("inbox", "locked.pdf")),
    )
    .await;

    assert_eq!(
        *source.passwords.lock().unwrap(),
        vec![Some("hunter2".to_string())]
    );
}

#[tokio::test]
async fn outcome_serialises_with_status_tags() {
    let stores = Arc::new(MemoryStores::default());
    stores.bucket("inbox").put("a.pdf", PDF_BYTES);
    let mut event = S3Event::single("inbox", "a.pdf");
    event.records.extend(S3Event::single("inbox", "notes.txt").records);

    let outcome = within(
        driver(FakeSource::new(1), stores, ConversionConfig::default()).handle_event(&event),
    )
    .await;

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["records"][0]["status"], "converted");
    assert_eq!(json["records"][0]["uploaded"][0], "a-1.jpeg");
    assert_eq!(json["records"][1]["status"], "skipped");
}
