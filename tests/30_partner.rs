mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{future_date, str_field, Account, TestServer};

#[tokio::test]
async fn onboarding_and_profile_updates() -> Result<()> {
    let server = TestServer::start().await?;
    let (partner, partner_id) = server
        .onboarded_partner("Prism", "prism@example.com", "Chennai", &["portrait", "wedding", "portrait"])
        .await?;

    let (status, body) = server.get("/api/partner/profile", Some(&partner.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], partner_id.as_str());
    assert_eq!(body["data"]["verificationStatus"], "pending");
    assert_eq!(body["data"]["services"], json!(["wedding", "portrait"]));
    // only the last four digits are ever returned
    assert_eq!(body["data"]["aadharNumber"], "XXXXXXXX1234");

    let (status, body) = server
        .post(
            "/api/partner/onboard",
            Some(&partner.token),
            json!({
                "businessName": "Prism Again",
                "services": ["event"],
                "city": "Chennai",
                "aadharNumber": "999988887777",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Partner profile already exists");

    let (status, body) = server
        .put(
            "/api/partner/profile",
            Some(&partner.token),
            json!({ "city": "Madurai", "about": "Now travelling statewide" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["city"], "Madurai");
    assert_eq!(body["data"]["businessName"], "Prism Studio");
    assert_eq!(body["data"]["verificationStatus"], "pending");

    let (status, _) = server
        .put("/api/partner/profile", Some(&partner.token), json!({ "services": [] }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn onboarding_validates_identity_and_services() -> Result<()> {
    let server = TestServer::start().await?;
    let partner = server.signup("Blur", "blur@example.com", "partner").await?;

    let (status, _) = server
        .post(
            "/api/partner/onboard",
            Some(&partner.token),
            json!({
                "businessName": "Blur",
                "services": ["wedding"],
                "city": "Nagpur",
                "aadharNumber": "1234",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post(
            "/api/partner/onboard",
            Some(&partner.token),
            json!({
                "businessName": "Blur",
                "services": [],
                "city": "Nagpur",
                "aadharNumber": "123412341234",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn portfolio_items_are_owned_and_ordered() -> Result<()> {
    let server = TestServer::start().await?;
    let (owner, _) = server
        .onboarded_partner("Grain", "grain@example.com", "Indore", &["product"])
        .await?;
    let (intruder, _) = server
        .onboarded_partner("Noise", "noise@example.com", "Indore", &["product"])
        .await?;

    let mut item_ids = Vec::new();
    for title in ["Watches", "Sneakers"] {
        let (status, body) = server
            .post(
                "/api/partner/portfolio",
                Some(&owner.token),
                json!({
                    "title": title,
                    "category": "product",
                    "imageUrl": format!("https://img.pixisphere.test/{}.jpg", title),
                }),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED);
        item_ids.push(str_field(&body["data"]["id"])?);
    }

    let (status, body) = server.get("/api/partner/portfolio", Some(&owner.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["title"], "Watches");
    assert_eq!(body["data"][0]["displayOrder"], 1);
    assert_eq!(body["data"][1]["displayOrder"], 2);

    let path = format!("/api/partner/portfolio/{}", item_ids[0]);
    let (status, _) = server
        .put(&path, Some(&intruder.token), json!({ "title": "Mine now" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server.delete(&path, Some(&intruder.token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server
        .put(&path, Some(&owner.token), json!({ "title": "Luxury watches" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Luxury watches");
    assert_eq!(body["data"]["displayOrder"], 1);

    let (status, _) = server
        .post(
            "/api/partner/portfolio",
            Some(&owner.token),
            json!({ "title": "No image", "category": "product" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server.delete(&path, Some(&owner.token)).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server.get("/api/partner/portfolio", Some(&owner.token)).await?;
    assert_eq!(body["count"], 1);
    Ok(())
}

/// Book a fresh inquiry between `client` and `partner` and return its id
async fn booked_inquiry(server: &TestServer, client: &Account, partner: &Account, city: &str) -> Result<String> {
    let (status, body) = server
        .post(
            "/api/inquiry",
            Some(&client.token),
            json!({
                "category": "maternity",
                "date": future_date(),
                "budget": "18000.50",
                "city": city,
            }),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "inquiry failed: {}", body);
    let inquiry_id = str_field(&body["data"]["id"])?;

    let (status, body) = server
        .put(
            &format!("/api/partner/leads/{}", inquiry_id),
            Some(&partner.token),
            json!({ "status": "booked" }),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::OK, "booking failed: {}", body);
    Ok(inquiry_id)
}

#[tokio::test]
async fn reviews_require_a_booking_and_moderation() -> Result<()> {
    let server = TestServer::start().await?;
    let admin = server.admin().await?;
    let (partner, partner_id) = server
        .verified_partner(&admin, "Glow", "glow@example.com", "Lucknow", &["maternity"])
        .await?;
    let client = server.signup("Ira", "ira@example.com", "client").await?;

    // not yet booked
    let (_, body) = server
        .post(
            "/api/inquiry",
            Some(&client.token),
            json!({ "category": "maternity", "date": future_date(), "budget": 12000, "city": "Lucknow" }),
        )
        .await?;
    let open_id = str_field(&body["data"]["id"])?;
    let (status, _) = server
        .post(
            &format!("/api/inquiry/{}/review", open_id),
            Some(&client.token),
            json!({ "rating": 5, "comment": "Lovely" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let booked_id = booked_inquiry(&server, &client, &partner, "Lucknow").await?;
    let review_path = format!("/api/inquiry/{}/review", booked_id);

    let (status, _) = server
        .post(&review_path, Some(&client.token), json!({ "rating": 6, "comment": "Too good" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .post(&review_path, Some(&client.token), json!({ "rating": 4, "comment": "Warm and patient" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["isApproved"], false);
    assert_eq!(body["data"]["partner"], partner_id.as_str());
    let review_id = str_field(&body["data"]["id"])?;

    // one review per client and partner
    let (status, _) = server
        .post(&review_path, Some(&client.token), json!({ "rating": 3, "comment": "Again" }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    // unapproved reviews stay off the public profile
    let profile_path = format!("/api/partners/{}", partner_id);
    let (status, body) = server.get(&profile_path, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reviewCount"], 0);
    assert!(body["data"]["averageRating"].is_null());

    let (status, _) = server
        .put(
            &format!("/api/admin/reviews/{}", review_id),
            Some(&admin.token),
            json!({ "isApproved": true }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server.get(&profile_path, None).await?;
    assert_eq!(body["data"]["reviewCount"], 1);
    assert_eq!(body["data"]["averageRating"], 4.0);
    assert_eq!(body["data"]["partner"]["businessName"], "Glow Studio");

    // identity and verification bookkeeping never reach anonymous visitors
    let public = &body["data"]["partner"];
    for private in ["aadharNumber", "verifiedBy", "verificationComment"] {
        assert!(public.get(private).is_none(), "{} is public", private);
    }
    Ok(())
}

#[tokio::test]
async fn public_profile_hides_unverified_partners() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, partner_id) = server
        .onboarded_partner("Shade", "shade@example.com", "Bhopal", &["commercial"])
        .await?;

    let (status, body) = server.get(&format!("/api/partners/{}", partner_id), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}
