use jni::{
    errors::Error,
    objects::{JObject, JValue},
    JNIEnv,
};

/// Action to invoke with an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    View,
}

impl AsRef<str> for Action {
    fn as_ref(&self) -> &str {
        match self {
            Self::View => "ACTION_VIEW",
        }
    }
}

/// A messaging object used to request an action from another android app
/// component.
#[must_use]
pub(crate) struct Intent<'local> {
    object: JObject<'local>,
}

impl<'local> Intent<'local> {
    pub fn new_with_uri(
        env: &mut JNIEnv<'local>,
        action: Action,
        uri: impl AsRef<str>,
    ) -> Result<Self, Error> {
        let uri_string = env.new_string(uri)?;
        let uri = env
            .call_static_method(
                "android/net/Uri",
                "parse",
                "(Ljava/lang/String;)Landroid/net/Uri;",
                &[JValue::Object(&uri_string)],
            )?
            .l()?;

        let action = env
            .get_static_field("android/content/Intent", action.as_ref(), "Ljava/lang/String;")?
            .l()?;

        let object = env.new_object(
            "android/content/Intent",
            "(Ljava/lang/String;Landroid/net/Uri;)V",
            &[JValue::Object(&action), JValue::Object(&uri)],
        )?;

        Ok(Self { object })
    }

    pub fn start_activity(self, env: &mut JNIEnv<'local>, activity: &JObject) -> Result<(), Error> {
        env.call_method(
            activity,
            "startActivity",
            "(Landroid/content/Intent;)V",
            &[JValue::Object(&self.object)],
        )?;
        Ok(())
    }
}
