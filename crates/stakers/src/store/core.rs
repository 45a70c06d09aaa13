use redis::Client;

#[derive(Clone)]
pub struct RedisStore {
    pub(crate) client: Client,
}

impl RedisStore {
    pub fn new(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = Client::open(redis_url)?;
        Ok(Self { client })
    }
}
