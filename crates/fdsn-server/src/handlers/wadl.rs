//! Static `application.wadl` descriptions of each service.

use axum::{
  http::header,
  response::{IntoResponse, Response},
};

fn wadl(body: &'static str) -> Response {
  ([(header::CONTENT_TYPE, crate::xml::CONTENT_TYPE)], body).into_response()
}

pub async fn station() -> Response { wadl(STATION_WADL) }

pub async fn dataselect() -> Response { wadl(DATASELECT_WADL) }

pub async fn availability() -> Response { wadl(AVAILABILITY_WADL) }

pub const STATION_WADL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<application xmlns="http://wadl.dev.java.net/2009/02"
  xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <resources base="/fdsnws/station/1/">
    <resource path="query">
      <method name="GET">
        <request>
          <param name="net" style="query" type="xsd:string"/>
          <param name="sta" style="query" type="xsd:string"/>
          <param name="loc" style="query" type="xsd:string"/>
          <param name="cha" style="query" type="xsd:string"/>
          <param name="starttime" style="query" type="xsd:dateTime"/>
          <param name="endtime" style="query" type="xsd:dateTime"/>
          <param name="level" style="query" type="xsd:string" default="station"/>
          <param name="format" style="query" type="xsd:string" default="xml"/>
          <param name="minlat" style="query" type="xsd:float"/>
          <param name="maxlat" style="query" type="xsd:float"/>
          <param name="minlon" style="query" type="xsd:float"/>
          <param name="maxlon" style="query" type="xsd:float"/>
        </request>
        <response>
          <representation mediaType="application/xml"/>
          <representation mediaType="text/plain"/>
        </response>
      </method>
    </resource>
    <resource path="version">
      <method name="GET"/>
    </resource>
    <resource path="application.wadl">
      <method name="GET"/>
    </resource>
  </resources>
</application>
"#;

pub const DATASELECT_WADL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<application xmlns="http://wadl.dev.java.net/2009/02"
  xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <resources base="/fdsnws/dataselect/1/">
    <resource path="query">
      <method name="GET">
        <request>
          <param name="net" style="query" type="xsd:string" required="true"/>
          <param name="sta" style="query" type="xsd:string" required="true"/>
          <param name="loc" style="query" type="xsd:string"/>
          <param name="cha" style="query" type="xsd:string" required="true"/>
          <param name="starttime" style="query" type="xsd:dateTime" required="true"/>
          <param name="endtime" style="query" type="xsd:dateTime" required="true"/>
        </request>
        <response>
          <representation mediaType="application/vnd.fdsn.mseed"/>
        </response>
      </method>
    </resource>
    <resource path="version">
      <method name="GET"/>
    </resource>
    <resource path="application.wadl">
      <method name="GET"/>
    </resource>
  </resources>
</application>
"#;

pub const AVAILABILITY_WADL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<application xmlns="http://wadl.dev.java.net/2009/02"
  xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <resources base="/fdsnws/availability/1/">
    <resource path="query">
      <method name="GET">
        <request>
          <param name="net" style="query" type="xsd:string"/>
          <param name="sta" style="query" type="xsd:string"/>
          <param name="loc" style="query" type="xsd:string"/>
          <param name="cha" style="query" type="xsd:string"/>
          <param name="starttime" style="query" type="xsd:dateTime"/>
          <param name="endtime" style="query" type="xsd:dateTime"/>
        </request>
        <response>
          <representation mediaType="text/plain"/>
        </response>
      </method>
    </resource>
    <resource path="extent">
      <method name="GET">
        <request>
          <param name="net" style="query" type="xsd:string"/>
          <param name="sta" style="query" type="xsd:string"/>
          <param name="loc" style="query" type="xsd:string"/>
          <param name="cha" style="query" type="xsd:string"/>
          <param name="starttime" style="query" type="xsd:dateTime"/>
          <param name="endtime" style="query" type="xsd:dateTime"/>
        </request>
        <response>
          <representation mediaType="text/plain"/>
        </response>
      </method>
    </resource>
    <resource path="version">
      <method name="GET"/>
    </resource>
    <resource path="application.wadl">
      <method name="GET"/>
    </resource>
  </resources>
</application>
"#;
