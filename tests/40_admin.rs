mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{future_date, str_field, TestServer};

#[tokio::test]
async fn verification_queue_and_decisions() -> Result<()> {
    let server = TestServer::start().await?;
    let admin = server.admin().await?;
    let (_, first) = server
        .onboarded_partner("Ansel", "ansel@example.com", "Kolkata", &["wedding"])
        .await?;
    let (_, second) = server
        .onboarded_partner("Brandt", "brandt@example.com", "Kolkata", &["event"])
        .await?;

    let (status, body) = server.get("/api/admin/verifications", Some(&admin.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    // oldest first, with the account's contact details
    assert_eq!(body["data"][0]["id"], first.as_str());
    assert_eq!(body["data"][0]["userDetails"]["email"], "ansel@example.com");
    // admins see the full identity number
    assert_eq!(body["data"][0]["aadharNumber"], "123412341234");

    let (status, _) = server
        .put(
            &format!("/api/admin/verify/{}", first),
            Some(&admin.token),
            json!({ "status": "pending" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .put(
            &format!("/api/admin/verify/{}", first),
            Some(&admin.token),
            json!({ "status": "verified" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["verificationStatus"], "verified");
    assert_eq!(body["data"]["verifiedBy"], admin.id.as_str());
    assert!(body["data"]["verifiedAt"].is_string());

    let (status, body) = server
        .put(
            &format!("/api/admin/verify/{}", second),
            Some(&admin.token),
            json!({ "status": "rejected", "comment": "Aadhar image unreadable" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["verificationStatus"], "rejected");
    assert_eq!(body["data"]["verificationComment"], "Aadhar image unreadable");
    assert!(body["data"]["verifiedAt"].is_null());

    let (_, body) = server.get("/api/admin/verifications", Some(&admin.token)).await?;
    assert_eq!(body["count"], 0);

    let (status, _) = server
        .put(
            "/api/admin/verify/00000000-0000-0000-0000-000000000000",
            Some(&admin.token),
            json!({ "status": "verified" }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn partner_listing_filters() -> Result<()> {
    let server = TestServer::start().await?;
    let admin = server.admin().await?;
    server
        .verified_partner(&admin, "North", "north@example.com", "Delhi", &["wedding"])
        .await?;
    server
        .onboarded_partner("South", "south@example.com", "Chennai", &["wedding", "product"])
        .await?;
    server
        .onboarded_partner("West", "west@example.com", "Delhi", &["product"])
        .await?;

    let (status, body) = server.get("/api/admin/partners", Some(&admin.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    // newest first
    assert_eq!(body["data"][0]["businessName"], "West Studio");

    let (_, body) = server
        .get("/api/admin/partners?status=verified", Some(&admin.token))
        .await?;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["businessName"], "North Studio");

    let (_, body) = server
        .get("/api/admin/partners?city=delhi&service=product", Some(&admin.token))
        .await?;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["businessName"], "West Studio");

    let (status, _) = server
        .get("/api/admin/partners?status=sleeping", Some(&admin.token))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn feature_flag_requires_boolean() -> Result<()> {
    let server = TestServer::start().await?;
    let admin = server.admin().await?;
    let (_, partner_id) = server
        .verified_partner(&admin, "Halo", "halo@example.com", "Patna", &["portrait"])
        .await?;
    let path = format!("/api/admin/partners/{}/feature", partner_id);

    let (status, _) = server.put(&path, Some(&admin.token), json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server.put(&path, Some(&admin.token), json!({ "featured": "yes" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server.put(&path, Some(&admin.token), json!({ "featured": true })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isFeatured"], true);
    Ok(())
}

#[tokio::test]
async fn dashboard_stats_and_review_moderation() -> Result<()> {
    let server = TestServer::start().await?;
    let admin = server.admin().await?;
    let (partner, _) = server
        .verified_partner(&admin, "Lumen", "lumen@example.com", "Ranchi", &["event"])
        .await?;
    server
        .onboarded_partner("Later", "later@example.com", "Ranchi", &["event"])
        .await?;
    let client = server.signup("Tara", "tara@example.com", "client").await?;
    server.signup("Uma", "uma@example.com", "client").await?;

    let mut inquiry_ids = Vec::new();
    for _ in 0..2 {
        let (_, body) = server
            .post(
                "/api/inquiry",
                Some(&client.token),
                json!({ "category": "event", "date": future_date(), "budget": 20000, "city": "Ranchi" }),
            )
            .await?;
        inquiry_ids.push(str_field(&body["data"]["id"])?);
    }
    server
        .put(
            &format!("/api/partner/leads/{}", inquiry_ids[0]),
            Some(&partner.token),
            json!({ "status": "booked" }),
        )
        .await?;
    let (status, body) = server
        .post(
            &format!("/api/inquiry/{}/review", inquiry_ids[0]),
            Some(&client.token),
            json!({ "rating": 5, "comment": "Captured every moment" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let review_id = str_field(&body["data"]["id"])?;

    let (status, body) = server.get("/api/admin/stats", Some(&admin.token)).await?;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert_eq!(stats["userStats"]["totalClients"], 2);
    assert_eq!(stats["userStats"]["totalPartners"], 2);
    assert_eq!(stats["userStats"]["pendingVerifications"], 1);
    assert_eq!(stats["inquiryStats"]["total"], 2);
    assert_eq!(stats["inquiryStats"]["new"], 1);
    assert_eq!(stats["inquiryStats"]["booked"], 1);
    assert_eq!(stats["reviewStats"]["pendingReviews"], 1);

    let (_, body) = server
        .get("/api/admin/reviews?approved=false", Some(&admin.token))
        .await?;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["clientName"], "Tara");
    assert_eq!(body["data"][0]["partnerBusinessName"], "Lumen Studio");

    let (status, _) = server
        .get("/api/admin/reviews?approved=maybe", Some(&admin.token))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let review_path = format!("/api/admin/reviews/{}", review_id);
    let (status, _) = server.put(&review_path, Some(&admin.token), json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .put(
            &review_path,
            Some(&admin.token),
            json!({ "isApproved": true, "comment": "Captured every moment!" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isApproved"], true);
    assert_eq!(body["data"]["comment"], "Captured every moment!");

    let (_, body) = server
        .get("/api/admin/reviews?approved=true", Some(&admin.token))
        .await?;
    assert_eq!(body["count"], 1);

    let (status, _) = server.delete(&review_path, Some(&admin.token)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.delete(&review_path, Some(&admin.token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = server.get("/api/admin/reviews", Some(&admin.token)).await?;
    assert_eq!(body["count"], 0);
    Ok(())
}
