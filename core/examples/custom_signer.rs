use async_trait::async_trait;
use nutrisign_core::hash::base64_hmac_sha1;
use nutrisign_core::{
    Context, ProvideCredential, Result, SignRequest, Signer, SigningCredential, SigningRequest,
    StaticEnv,
};

// Define a custom credential type
#[derive(Clone, Debug)]
struct MyCredential {
    api_key: String,
    api_secret: String,
}

impl SigningCredential for MyCredential {
    fn is_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

// Load credentials from the context env
#[derive(Debug)]
struct MyCredentialLoader;

#[async_trait]
impl ProvideCredential for MyCredentialLoader {
    type Credential = MyCredential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let (Some(api_key), Some(api_secret)) =
            (ctx.env_var("MY_API_KEY"), ctx.env_var("MY_API_SECRET"))
        else {
            return Ok(None);
        };

        Ok(Some(MyCredential {
            api_key,
            api_secret,
        }))
    }
}

// Sign every parameter with the api secret
#[derive(Debug)]
struct MyRequestSigner;

impl SignRequest for MyRequestSigner {
    type Credential = MyCredential;

    fn sign_request(
        &self,
        _ctx: &Context,
        req: SigningRequest,
        credential: Option<&Self::Credential>,
    ) -> Result<Option<SigningRequest>> {
        let Some(cred) = credential else {
            return Ok(None);
        };

        let mut req = req.with_param("api_key", &cred.api_key);
        let payload = req
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let signature = base64_hmac_sha1(cred.api_secret.as_bytes(), payload.as_bytes());
        req.params.insert("api_signature".to_string(), signature);

        Ok(Some(req))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Use a fixed env so the example runs anywhere
    let ctx = Context::new().with_env(StaticEnv::from_pairs([
        ("MY_API_KEY", "demo-api-key"),
        ("MY_API_SECRET", "demo-api-secret"),
    ]));

    let signer = Signer::new(ctx, MyCredentialLoader, MyRequestSigner);

    let req = SigningRequest::get("https://api.example.com/v1/foods").with_param("q", "banana");

    match signer.sign(req).await? {
        Some(signed) => println!("Signed params: {:?}", signed.params),
        None => eprintln!("No credential available, request not signed"),
    }

    Ok(())
}
