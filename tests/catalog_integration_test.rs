//! Storefront listing endpoints: catalog filters and sorting, product pages,
//! popular/limited/banner selections, sales and tags.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{ids, response_json, ProductSeed, TestApp};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn price_range_is_inclusive_on_both_bounds() {
    let app = TestApp::new().await;
    let phones = app.category("Phones", None).await;

    let cheap = app.product(ProductSeed::new("Cheap", phones.id, dec!(99.99))).await;
    let low = app.product(ProductSeed::new("Low", phones.id, dec!(100))).await;
    let high = app.product(ProductSeed::new("High", phones.id, dec!(200))).await;
    let pricey = app.product(ProductSeed::new("Pricey", phones.id, dec!(200.01))).await;

    let response = app
        .get("/api/catalog?filter%5BminPrice%5D=100&filter%5BmaxPrice%5D=200&sort=price&sortType=inc")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let found = ids(&body["items"]);
    assert_eq!(found, vec![low.id as i64, high.id as i64]);
    assert!(!found.contains(&(cheap.id as i64)));
    assert!(!found.contains(&(pricey.id as i64)));
}

#[tokio::test]
async fn category_filter_includes_descendants() {
    let app = TestApp::new().await;
    let electronics = app.category("Electronics", None).await;
    let phones = app.category("Phones", Some(electronics.id)).await;
    let android = app.category("Android", Some(phones.id)).await;
    let garden = app.category("Garden", None).await;

    let tv = app.product(ProductSeed::new("TV", electronics.id, dec!(500))).await;
    let phone = app.product(ProductSeed::new("Phone", phones.id, dec!(300))).await;
    let pixel = app.product(ProductSeed::new("Pixel", android.id, dec!(400))).await;
    app.product(ProductSeed::new("Rake", garden.id, dec!(20))).await;

    let body = response_json(
        app.get(&format!("/api/catalog?category={}&sort=price&sortType=inc", electronics.id))
            .await,
    )
    .await;
    assert_eq!(
        ids(&body["items"]),
        vec![phone.id as i64, pixel.id as i64, tv.id as i64]
    );

    let body = response_json(app.get(&format!("/api/catalog?category={}", phones.id)).await).await;
    let mut found = ids(&body["items"]);
    found.sort_unstable();
    assert_eq!(found, vec![phone.id as i64, pixel.id as i64]);
}

#[tokio::test]
async fn unknown_category_gives_an_empty_page() {
    let app = TestApp::new().await;
    let phones = app.category("Phones", None).await;
    app.product(ProductSeed::new("Phone", phones.id, dec!(300))).await;

    let body = response_json(app.get("/api/catalog?category=9999").await).await;
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["lastPage"], 1);
}

#[tokio::test]
async fn catalog_hides_archived_and_applies_flag_filters() {
    let app = TestApp::new().await;
    let phones = app.category("Phones", None).await;

    let shipped_free = app
        .product(ProductSeed::new("Free", phones.id, dec!(10)).free_delivery())
        .await;
    app.product(ProductSeed::new("Paid", phones.id, dec!(10))).await;
    app.product(ProductSeed::new("Gone", phones.id, dec!(10)).free_delivery().archived())
        .await;
    app.product(ProductSeed::new("Sold out", phones.id, dec!(10)).free_delivery().count(0))
        .await;

    let body = response_json(
        app.get("/api/catalog?filter%5BfreeDelivery%5D=true&filter%5Bavailable%5D=true")
            .await,
    )
    .await;
    assert_eq!(ids(&body["items"]), vec![shipped_free.id as i64]);
}

#[tokio::test]
async fn name_filter_is_case_insensitive() {
    let app = TestApp::new().await;
    let phones = app.category("Phones", None).await;
    let galaxy = app.product(ProductSeed::new("Galaxy S24", phones.id, dec!(10))).await;
    app.product(ProductSeed::new("Pixel 9", phones.id, dec!(10))).await;

    let body = response_json(app.get("/api/catalog?filter%5Bname%5D=gAlAxY").await).await;
    assert_eq!(ids(&body["items"]), vec![galaxy.id as i64]);
}

#[tokio::test]
async fn tag_filter_matches_any_requested_tag() {
    let app = TestApp::new().await;
    let phones = app.category("Phones", None).await;
    let gaming = app.tag("gaming").await;
    let camera = app.tag("camera").await;

    let a = app.product(ProductSeed::new("A", phones.id, dec!(1))).await;
    let b = app.product(ProductSeed::new("B", phones.id, dec!(2))).await;
    app.product(ProductSeed::new("C", phones.id, dec!(3))).await;
    app.tag_product(a.id, gaming.id).await;
    app.tag_product(b.id, camera.id).await;

    let body = response_json(
        app.get(&format!(
            "/api/catalog?tags%5B%5D={}&tags%5B%5D={}&sort=price&sortType=inc",
            gaming.id, camera.id
        ))
        .await,
    )
    .await;
    assert_eq!(ids(&body["items"]), vec![a.id as i64, b.id as i64]);
    assert_eq!(body["items"][0]["tags"][0]["name"], "gaming");
}

#[tokio::test]
async fn pagination_reports_last_page() {
    let app = TestApp::new().await;
    let phones = app.category("Phones", None).await;
    for i in 0..5 {
        let price = dec!(10) + Decimal::from(i);
        app.product(ProductSeed::new(&format!("P{}", i), phones.id, price))
            .await;
    }

    let body = response_json(
        app.get("/api/catalog?limit=2&currentPage=3&sort=price&sortType=inc")
            .await,
    )
    .await;
    assert_eq!(body["currentPage"], 3);
    assert_eq!(body["lastPage"], 3);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["items"][0]["title"], "P4");
}

#[tokio::test]
async fn inverted_price_bounds_are_rejected() {
    let app = TestApp::new().await;
    let response = app
        .get("/api/catalog?filter%5BminPrice%5D=300&filter%5BmaxPrice%5D=100")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn page_numbers_past_the_end_give_empty_pages() {
    let app = TestApp::new().await;
    let phones = app.category("Phones", None).await;
    let product = app.product(ProductSeed::new("Phone", phones.id, dec!(100))).await;
    let now = Utc::now();
    app.sale(product.id, dec!(80), now, now + Duration::days(3)).await;

    for uri in [
        "/api/catalog?currentPage=18446744073709551615",
        "/api/sales?currentPage=18446744073709551615",
        "/api/catalog?currentPage=7",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let body = response_json(response).await;
        assert_eq!(body["items"], json!([]), "{}", uri);
        assert_eq!(body["lastPage"], 1, "{}", uri);
    }
}

#[rstest]
#[case("inc")]
#[case("dec")]
#[tokio::test]
async fn unrated_products_sort_last_by_rating(#[case] direction: &str) {
    let app = TestApp::new().await;
    let (reviewer, _) = app.customer("reviewer").await;
    let phones = app.category("Phones", None).await;

    let unrated = app.product(ProductSeed::new("Unrated", phones.id, dec!(10))).await;
    let good = app.product(ProductSeed::new("Good", phones.id, dec!(10))).await;
    let poor = app.product(ProductSeed::new("Poor", phones.id, dec!(10))).await;
    app.review(good.id, reviewer.id, 5).await;
    app.review(poor.id, reviewer.id, 2).await;

    let body = response_json(
        app.get(&format!("/api/catalog?sort=rating&sortType={}", direction))
            .await,
    )
    .await;
    let expected = if direction == "inc" {
        vec![poor.id as i64, good.id as i64, unrated.id as i64]
    } else {
        vec![good.id as i64, poor.id as i64, unrated.id as i64]
    };
    assert_eq!(ids(&body["items"]), expected);
}

#[tokio::test]
async fn sorting_by_review_count_uses_every_matching_product() {
    let app = TestApp::new().await;
    let (reviewer, _) = app.customer("reviewer").await;
    let phones = app.category("Phones", None).await;

    let mut seeded = Vec::new();
    for i in 0..4 {
        let product = app
            .product(ProductSeed::new(&format!("P{}", i), phones.id, dec!(10)))
            .await;
        for _ in 0..i {
            app.review(product.id, reviewer.id, 4).await;
        }
        seeded.push(product.id as i64);
    }

    let body = response_json(app.get("/api/catalog?sort=reviews&sortType=dec&limit=2").await).await;
    assert_eq!(ids(&body["items"]), vec![seeded[3], seeded[2]]);
    assert_eq!(body["items"][0]["reviews"], 3);
    assert_eq!(body["lastPage"], 2);

    let body = response_json(
        app.get("/api/catalog?sort=reviews&sortType=dec&limit=2&currentPage=2")
            .await,
    )
    .await;
    assert_eq!(ids(&body["items"]), vec![seeded[1], seeded[0]]);
}

#[tokio::test]
async fn name_filter_treats_wildcards_literally() {
    let app = TestApp::new().await;
    let clothes = app.category("Clothes", None).await;
    app.product(ProductSeed::new("Phone", clothes.id, dec!(10))).await;
    let cotton = app.product(ProductSeed::new("100% cotton", clothes.id, dec!(10))).await;
    let snake = app.product(ProductSeed::new("snake_case tee", clothes.id, dec!(10))).await;

    let body = response_json(app.get("/api/catalog?filter%5Bname%5D=_").await).await;
    assert_eq!(ids(&body["items"]), vec![snake.id as i64]);

    let body = response_json(app.get("/api/catalog?filter%5Bname%5D=0%25").await).await;
    assert_eq!(ids(&body["items"]), vec![cotton.id as i64]);
}

#[tokio::test]
async fn rating_is_the_mean_of_review_rates_and_null_without_reviews() {
    let app = TestApp::new().await;
    let (reviewer, _) = app.customer("reviewer").await;
    let phones = app.category("Phones", None).await;

    let rated = app.product(ProductSeed::new("Rated", phones.id, dec!(10))).await;
    let unrated = app.product(ProductSeed::new("Unrated", phones.id, dec!(20))).await;
    for rate in [5, 4, 4] {
        app.review(rated.id, reviewer.id, rate).await;
    }

    let body = response_json(app.get(&format!("/api/product/{}", rated.id)).await).await;
    let rating = body["rating"].as_f64().expect("rating");
    assert!((rating - 13.0 / 3.0).abs() < 1e-9);
    assert_eq!(body["reviews"].as_array().map(Vec::len), Some(3));

    let body = response_json(app.get(&format!("/api/product/{}", unrated.id)).await).await;
    assert!(body["rating"].is_null());

    let body = response_json(app.get("/api/catalog?sort=rating&sortType=dec").await).await;
    assert_eq!(ids(&body["items"]), vec![rated.id as i64, unrated.id as i64]);
    assert_eq!(body["items"][0]["reviews"], 3);
    assert!(body["items"][1]["rating"].is_null());
}

#[tokio::test]
async fn archived_product_page_is_not_found() {
    let app = TestApp::new().await;
    let phones = app.category("Phones", None).await;
    let gone = app.product(ProductSeed::new("Gone", phones.id, dec!(10)).archived()).await;

    assert_eq!(
        app.get(&format!("/api/product/{}", gone.id)).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.get("/api/product/4242").await.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case(0)]
#[case(6)]
#[case(-1)]
#[tokio::test]
async fn review_rate_outside_one_to_five_is_rejected(#[case] rate: i16) {
    let app = TestApp::new().await;
    let (_, token) = app.customer("critic").await;
    let phones = app.category("Phones", None).await;
    let product = app.product(ProductSeed::new("Phone", phones.id, dec!(10))).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/product/{}/reviews", product.id),
            Some(json!({"author": "Critic", "email": "critic@example.com", "text": "meh", "rate": rate})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(app.get(&format!("/api/product/{}", product.id)).await).await;
    assert_eq!(body["reviews"], json!([]));
}

#[tokio::test]
async fn posted_review_shows_on_the_product_page() {
    let app = TestApp::new().await;
    let (_, token) = app.customer("fan").await;
    let phones = app.category("Phones", None).await;
    let product = app.product(ProductSeed::new("Phone", phones.id, dec!(10))).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/product/{}/reviews", product.id),
            Some(json!({"author": "Fan", "email": "fan@example.com", "text": "great", "rate": 5})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let review = response_json(response).await;
    assert_eq!(review["rate"], 5);

    let anonymous = app
        .request(
            Method::POST,
            &format!("/api/product/{}/reviews", product.id),
            Some(json!({"author": "Anon", "email": "anon@example.com", "rate": 4})),
            None,
        )
        .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(app.get(&format!("/api/product/{}", product.id)).await).await;
    assert_eq!(body["reviews"][0]["author"], "Fan");
    assert_eq!(body["rating"].as_f64(), Some(5.0));
}

#[tokio::test]
async fn category_tree_nests_subcategories() {
    let app = TestApp::new().await;
    let electronics = app.category("Electronics", None).await;
    app.category("Phones", Some(electronics.id)).await;
    app.category("Books", None).await;

    let body = response_json(app.get("/api/categories").await).await;
    let roots = body.as_array().expect("array");
    assert_eq!(roots.len(), 2);

    let electronics_node = roots
        .iter()
        .find(|node| node["title"] == "Electronics")
        .expect("electronics root");
    assert_eq!(electronics_node["subcategories"][0]["title"], "Phones");
}

#[tokio::test]
async fn popular_orders_by_review_count_and_limited_by_date() {
    let app = TestApp::new().await;
    let (reviewer, _) = app.customer("reviewer").await;
    let phones = app.category("Phones", None).await;

    let quiet = app.product(ProductSeed::new("Quiet", phones.id, dec!(10))).await;
    let busy = app.product(ProductSeed::new("Busy", phones.id, dec!(10))).await;
    app.review(busy.id, reviewer.id, 3).await;
    app.review(busy.id, reviewer.id, 4).await;
    app.review(quiet.id, reviewer.id, 5).await;

    let old = app
        .product(ProductSeed::new("Old drop", phones.id, dec!(10)).limited().days_old(30))
        .await;
    let new = app
        .product(ProductSeed::new("New drop", phones.id, dec!(10)).limited().days_old(1))
        .await;

    let popular = response_json(app.get("/api/products/popular").await).await;
    let popular_ids = ids(&popular);
    assert_eq!(&popular_ids[..2], &[busy.id as i64, quiet.id as i64]);

    let limited = response_json(app.get("/api/products/limited").await).await;
    assert_eq!(ids(&limited), vec![new.id as i64, old.id as i64]);
}

#[tokio::test]
async fn banners_pick_the_best_rated_product_per_root_category() {
    let app = TestApp::new().await;
    let (reviewer, _) = app.customer("reviewer").await;
    let books = app.category("Books", None).await;
    let electronics = app.category("Electronics", None).await;
    let phones = app.category("Phones", Some(electronics.id)).await;

    let novel = app.product(ProductSeed::new("Novel", books.id, dec!(10))).await;
    let tv = app.product(ProductSeed::new("TV", electronics.id, dec!(10))).await;
    let phone = app.product(ProductSeed::new("Phone", phones.id, dec!(10))).await;
    app.review(tv.id, reviewer.id, 3).await;
    app.review(phone.id, reviewer.id, 5).await;
    app.review(novel.id, reviewer.id, 2).await;

    let body = response_json(app.get("/api/banners").await).await;
    assert_eq!(ids(&body), vec![novel.id as i64, phone.id as i64]);
}

#[tokio::test]
async fn sales_list_running_and_upcoming_offers() {
    let app = TestApp::new().await;
    let phones = app.category("Phones", None).await;
    let on_sale = app.product(ProductSeed::new("On sale", phones.id, dec!(100))).await;
    let expired = app.product(ProductSeed::new("Expired", phones.id, dec!(100))).await;

    let now = Utc::now();
    app.sale(on_sale.id, dec!(80), now - Duration::days(1), now + Duration::days(5))
        .await;
    app.sale(expired.id, dec!(50), now - Duration::days(10), now - Duration::days(2))
        .await;

    let body = response_json(app.get("/api/sales?currentPage=1").await).await;
    let items = body["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], on_sale.id);
    let sale_price: Decimal = items[0]["salePrice"]
        .as_str()
        .expect("decimal string")
        .parse()
        .expect("decimal");
    assert_eq!(sale_price, dec!(80));
    assert_eq!(
        items[0]["dateTo"],
        (now + Duration::days(5)).format("%m-%d").to_string()
    );
}

#[tokio::test]
async fn tags_can_be_scoped_to_a_category() {
    let app = TestApp::new().await;
    let phones = app.category("Phones", None).await;
    let books = app.category("Books", None).await;
    let gaming = app.tag("gaming").await;
    let classic = app.tag("classic").await;
    app.tag("unused").await;

    let phone = app.product(ProductSeed::new("Phone", phones.id, dec!(10))).await;
    let novel = app.product(ProductSeed::new("Novel", books.id, dec!(10))).await;
    app.tag_product(phone.id, gaming.id).await;
    app.tag_product(novel.id, classic.id).await;

    let all = response_json(app.get("/api/tags").await).await;
    let names: Vec<_> = all
        .as_array()
        .expect("array")
        .iter()
        .map(|t| t["name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["classic", "gaming", "unused"]);

    let scoped = response_json(app.get(&format!("/api/tags?category={}", phones.id)).await).await;
    assert_eq!(scoped, json!([{"id": gaming.id, "name": "gaming"}]));
}

#[tokio::test]
async fn product_images_are_rendered_as_media_urls() {
    let app = TestApp::new().await;
    let phones = app.category("Phones", None).await;
    let phone = app.product(ProductSeed::new("Phone", phones.id, dec!(10))).await;
    app.image(phone.id, "products/product_1/images/front.png").await;

    let body = response_json(app.get(&format!("/api/product/{}", phone.id)).await).await;
    assert_eq!(
        body["images"][0]["src"],
        "/media/products/product_1/images/front.png"
    );
}
